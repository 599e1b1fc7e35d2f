use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};

use crate::data::{Author, Category, ContentItem, Resource, ResourceKind};
use crate::heuristics::{
    categorize, compute_ranking, extract_attachments, extract_resources, reading_time, ContentSignals,
    OwnDomains, RegexSectionExtractor, SectionExtractor,
};
use crate::types::{RawAuthor, RawPost, RawResource};

const CATEGORY_TAXONOMY: &str = "category";
const TAG_TAXONOMY: &str = "post_tag";
const AVATAR_SIZE: &str = "96";

/// Turns raw CMS records into `ContentItem`s.
#[derive(Clone)]
pub struct Normalizer {
    own_domains: OwnDomains,
    default_author: Author,
    reserved_term: String,
    sections: Arc<dyn SectionExtractor>,
}

impl Normalizer {
    pub fn new(own_domains: OwnDomains, default_author: Author, reserved_term: impl Into<String>) -> Self {
        Self {
            own_domains,
            default_author,
            reserved_term: reserved_term.into(),
            sections: Arc::new(RegexSectionExtractor),
        }
    }

    /// Swap the markup section extractor.
    pub fn with_section_extractor(mut self, extractor: Arc<dyn SectionExtractor>) -> Self {
        self.sections = extractor;
        self
    }

    pub fn own_domains(&self) -> &OwnDomains { &self.own_domains }

    pub fn normalize(&self, post: &RawPost) -> ContentItem {
        let content = post.content.rendered.as_str();
        let embedded = &post.embedded;

        let tags = tag_names(post);
        let attachments = extract_attachments(&embedded.attachments, content);

        let ranking = post
            .ranking
            .as_ref()
            .and_then(|r| r.explicit())
            .unwrap_or_else(|| compute_ranking(ContentSignals::from_html(content, attachments.len())));

        let supplied_prereq = post.prerequisites.as_ref().and_then(|p| p.supplied());
        let supplied_obj = post.objectives.as_ref().and_then(|o| o.supplied());
        let (prerequisites, objectives) = match (supplied_prereq, supplied_obj) {
            (Some(p), Some(o)) => (p, o),
            (p, o) => {
                let found = self.sections.extract(content);
                (p.unwrap_or(found.prerequisites), o.unwrap_or(found.objectives))
            }
        };

        let resources = match post.resources.as_ref().and_then(|r| r.supplied()) {
            Some(list) => list.into_iter().filter_map(resource_from_source).collect(),
            None => extract_resources(content, &self.own_domains),
        };

        let reading_time = reading_time(content, attachments.len(), resources.len());
        let category = categorize(self.term_category(post), &post.title.rendered, content, tags.as_slice());

        ContentItem {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.rendered.clone(),
            excerpt_html: post.excerpt.rendered.clone(),
            content_html: post.content.rendered.clone(),
            published_at: post.date.as_deref().and_then(parse_timestamp),
            modified_at: post.modified.as_deref().and_then(parse_timestamp),
            hero_image_url: embedded
                .featured_media
                .first()
                .and_then(|m| m.source_url.clone())
                .filter(|u| !u.trim().is_empty()),
            ranking,
            reading_time,
            author: self.author(embedded.author.first()),
            category,
            tags,
            prerequisites,
            objectives,
            resources,
            attachments,
        }
    }

    /// A category term other than the reserved knowledge-base term, if it names a known category.
    fn term_category(&self, post: &RawPost) -> Option<Category> {
        post.embedded
            .term_group(CATEGORY_TAXONOMY)
            .iter()
            .filter(|t| t.taxonomy == CATEGORY_TAXONOMY && t.slug != self.reserved_term)
            .find_map(|t| t.slug.parse::<Category>().ok())
    }

    fn author(&self, raw: Option<&RawAuthor>) -> Author {
        let Some(raw) = raw else { return self.default_author.clone() };
        Author {
            name: pick(raw.name.as_ref(), &self.default_author.name),
            bio: pick(raw.description.as_ref(), &self.default_author.bio),
            avatar_url: pick(raw.avatar_urls.get(AVATAR_SIZE), &self.default_author.avatar_url),
        }
    }
}

fn pick(value: Option<&String>, fallback: &str) -> String {
    value.map(|s| s.trim()).filter(|s| !s.is_empty()).unwrap_or(fallback).to_string()
}

fn tag_names(post: &RawPost) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for term in post.embedded.term_group(TAG_TAXONOMY).iter().filter(|t| t.taxonomy == TAG_TAXONOMY) {
        let name = term.name.trim();
        if !name.is_empty() && !out.iter().any(|t| t == name) {
            out.push(name.to_string());
        }
    }
    out
}

fn resource_from_source(raw: RawResource) -> Option<Resource> {
    let url = raw.url.trim();
    if url.is_empty() {
        return None;
    }
    let title = if raw.title.trim().is_empty() { url.to_string() } else { raw.title.trim().to_string() };
    Some(Resource { title, url: url.to_string(), kind: ResourceKind::from_source(&raw.kind) })
}

/// CMS dates come without an offset (`2024-01-15T10:00:00`); RFC 3339 is accepted too.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttachmentKind, ContentId};
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::new(OwnDomains::new(["localhost", "codevs.com"]), Author::default(), "knowledge-base")
    }

    fn raw(v: serde_json::Value) -> RawPost {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn full_record() {
        let post = raw(json!({
            "id": 12,
            "slug": "hooks",
            "title": { "rendered": "React Hooks" },
            "excerpt": { "rendered": "<p>Intro</p>" },
            "content": { "rendered": "<h3>Prerrequisitos</h3><ul><li>JS</li></ul><p>Mira <a href=\"https://github.com/facebook/react\">el repo</a> y <a href=\"/files/guia.pdf\">la guía</a></p>" },
            "date": "2024-01-15T10:00:00",
            "modified": "2024-02-01T08:30:00",
            "_embedded": {
                "author": [{ "name": "Ana", "description": "", "avatar_urls": { "96": "https://gravatar/a.png" } }],
                "wp:featuredmedia": [{ "source_url": "https://cdn/hero.jpg" }],
                "wp:term": [
                    [
                        { "id": 3, "name": "Knowledge", "slug": "knowledge-base", "taxonomy": "category" },
                        { "id": 4, "name": "Frontend", "slug": "frontend", "taxonomy": "category" }
                    ],
                    [
                        { "id": 8, "name": "react", "slug": "react", "taxonomy": "post_tag" },
                        { "id": 8, "name": "react", "slug": "react", "taxonomy": "post_tag" },
                        { "id": 9, "name": "hooks", "slug": "hooks", "taxonomy": "post_tag" }
                    ]
                ]
            }
        }));

        let item = normalizer().normalize(&post);
        assert_eq!(item.id, ContentId::Num(12));
        assert_eq!(item.title, "React Hooks");
        assert_eq!(item.category, Category::Frontend);
        assert_eq!(item.tags, vec!["react", "hooks"]);
        assert_eq!(item.prerequisites, vec!["JS"]);
        assert!(item.objectives.is_empty());
        assert_eq!(item.resources.len(), 1);
        assert_eq!(item.resources[0].kind, ResourceKind::Repository);
        assert_eq!(item.attachments.len(), 1);
        assert_eq!(item.attachments[0].kind, AttachmentKind::Pdf);
        assert_eq!(item.hero_image_url.as_deref(), Some("https://cdn/hero.jpg"));
        assert_eq!(item.author.name, "Ana");
        assert_eq!(item.author.bio, Author::default().bio);
        assert_eq!(item.author.avatar_url, "https://gravatar/a.png");
        assert_eq!(item.published_at, parse_timestamp("2024-01-15T10:00:00"));
        assert!(item.modified_at.is_some());
        assert_eq!(item.ranking, 1);
        // few words, 1 attachment (+1), 1 resource (+1)
        assert_eq!(item.reading_time.minutes, 1 + 1 + 1);
    }

    #[test]
    fn bare_record_gets_placeholders() {
        let item = normalizer().normalize(&raw(json!({ "id": 1, "slug": "x" })));
        assert_eq!(item.author, Author::default());
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.ranking, 1);
        assert_eq!(item.reading_time.to_string(), "< 1 min");
        assert!(item.published_at.is_none());
        assert!(item.hero_image_url.is_none());
    }

    #[test]
    fn explicit_fields_win() {
        let post = raw(json!({
            "slug": "x",
            "ranking": "5",
            "content": { "rendered": "<h3>Objetivos</h3><ul><li>ignorado</li></ul><a href=\"https://github.com/z\">z</a>" },
            "prerequisites": "Rust\nCargo",
            "objectives": ["Escribir tests"],
            "resources": "[{\"title\":\"Libro\",\"url\":\"https://doc.rust-lang.org/book\",\"type\":\"docs\"}]"
        }));
        let item = normalizer().normalize(&post);
        assert_eq!(item.ranking, 5);
        assert_eq!(item.prerequisites, vec!["Rust", "Cargo"]);
        assert_eq!(item.objectives, vec!["Escribir tests"]);
        assert_eq!(item.resources.len(), 1);
        assert_eq!(item.resources[0].kind, ResourceKind::Documentation);
    }

    #[test]
    fn out_of_range_ranking_is_computed_instead() {
        let long = format!("<p>{}</p><pre><code>x</code></pre>", "a".repeat(2500));
        for bad in [json!(9), json!(0), json!("2.5"), json!(4.5)] {
            let item = normalizer().normalize(&raw(json!({ "slug": "x", "ranking": bad, "content": { "rendered": long.as_str() } })));
            assert_eq!(item.ranking, 4, "ranking {bad}");
        }
    }

    #[test]
    fn unknown_category_terms_fall_through() {
        let post = raw(json!({
            "slug": "x",
            "title": { "rendered": "Docker y Kubernetes" },
            "_embedded": { "wp:term": [[{ "id": 1, "slug": "uncategorized", "taxonomy": "category" }]] }
        }));
        assert_eq!(normalizer().normalize(&post).category, Category::Devops);
    }

    #[test]
    fn timestamps() {
        assert!(parse_timestamp("2024-01-15T10:00:00").is_some());
        assert!(parse_timestamp("2024-01-15T10:00:00+02:00").is_some());
        assert!(parse_timestamp("ayer").is_none());
    }
}
