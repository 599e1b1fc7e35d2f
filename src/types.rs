//! Wire records as served by the CMS REST API.
//!
//! Every field is optional on the wire. A field with an unexpected shape is
//! replaced by its default rather than failing the whole record, so a single
//! odd post never empties a listing.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::data::ContentId;
use crate::error::{Result, SourceError};

fn lenient<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let v = Value::deserialize(d)?;
    Ok(T::deserialize(v).unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default, deserialize_with = "lenient")]
    pub rendered: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "lenient")]
    pub id: ContentId,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub excerpt: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub modified: Option<String>,
    /// Term ids of the `category` taxonomy (generic posts only).
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Option<Vec<u64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub ranking: Option<RawRanking>,
    #[serde(default, deserialize_with = "lenient")]
    pub prerequisites: Option<TextList>,
    #[serde(default, deserialize_with = "lenient")]
    pub objectives: Option<TextList>,
    #[serde(default, deserialize_with = "lenient")]
    pub resources: Option<RawResources>,
    #[serde(rename = "_embedded", default, deserialize_with = "lenient")]
    pub embedded: Embedded,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRanking {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawRanking {
    /// The explicit ranking if it is usable: an integral value in 1..=5.
    pub fn explicit(&self) -> Option<u8> {
        let n = match self {
            RawRanking::Int(n) => *n,
            RawRanking::Float(f) if f.fract() == 0.0 => *f as i64,
            RawRanking::Float(f) => {
                tracing::debug!(ranking = *f, "explicit ranking is not a whole number, computing one");
                return None;
            }
            RawRanking::Text(s) => s.trim().parse().ok()?,
        };
        if !(1..=5).contains(&n) {
            tracing::debug!(ranking = n, "explicit ranking out of range, computing one");
            return None;
        }
        Some(n as u8)
    }
}

/// A list field that may arrive as an array or as newline-separated text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    List(Vec<String>),
    Text(String),
}

impl TextList {
    /// `None` means "not supplied"; blank text counts as not supplied.
    pub fn supplied(&self) -> Option<Vec<String>> {
        match self {
            TextList::List(v) => Some(v.clone()),
            TextList::Text(s) if s.trim().is_empty() => None,
            TextList::Text(s) => Some(
                s.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawResource {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
}

/// Resources arrive either as an array or as a JSON document in a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawResources {
    List(Vec<RawResource>),
    Json(String),
}

impl RawResources {
    pub fn supplied(&self) -> Option<Vec<RawResource>> {
        match self {
            RawResources::List(v) => Some(v.clone()),
            RawResources::Json(s) if s.trim().is_empty() => None,
            RawResources::Json(s) => match serde_json::from_str::<Vec<RawResource>>(s) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unparsable resources field");
                    None
                }
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embedded {
    #[serde(default, deserialize_with = "lenient")]
    pub author: Vec<RawAuthor>,
    #[serde(rename = "wp:featuredmedia", default, deserialize_with = "lenient")]
    pub featured_media: Vec<RawMedia>,
    #[serde(rename = "wp:term", default, deserialize_with = "lenient")]
    pub terms: Vec<Vec<RawTerm>>,
    #[serde(rename = "wp:attachment", default, deserialize_with = "lenient")]
    pub attachments: Vec<RawMedia>,
}

impl Embedded {
    /// First term group containing a term of `taxonomy`.
    pub fn term_group(&self, taxonomy: &str) -> &[RawTerm] {
        self.terms
            .iter()
            .find(|group| group.iter().any(|t| t.taxonomy == taxonomy))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub filesize: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMedia {
    #[serde(default, deserialize_with = "lenient")]
    pub id: ContentId,
    #[serde(default, deserialize_with = "lenient")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub caption: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Rendered,
    #[serde(default, deserialize_with = "lenient")]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub media_details: MediaDetails,
}

impl RawMedia {
    pub fn size_bytes(&self) -> u64 {
        self.filesize.or(self.media_details.filesize).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTerm {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub taxonomy: String,
}

/// Decode a JSON array element by element, skipping elements that are not
/// records at all.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    let Value::Array(items) = body else {
        return Err(SourceError::Malformed("expected a JSON array".to_string()));
    };
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(v) => out.push(v),
            Err(e) => tracing::warn!(index = idx, error = %e, "skipping undecodable record"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_field_shapes_fall_back_to_defaults() {
        let post: RawPost = serde_json::from_value(json!({
            "id": 7,
            "slug": "intro",
            "title": "not an object",
            "content": { "rendered": "<p>hi</p>" },
            "categories": "nope",
            "_embedded": { "author": 42 }
        }))
        .unwrap();
        assert_eq!(post.id, ContentId::Num(7));
        assert_eq!(post.title.rendered, "");
        assert_eq!(post.content.rendered, "<p>hi</p>");
        assert!(post.categories.is_none());
        assert!(post.embedded.author.is_empty());
    }

    #[test]
    fn explicit_ranking_must_be_in_range() {
        assert_eq!(RawRanking::Int(4).explicit(), Some(4));
        assert_eq!(RawRanking::Text(" 2 ".into()).explicit(), Some(2));
        assert_eq!(RawRanking::Float(3.0).explicit(), Some(3));
        assert_eq!(RawRanking::Int(0).explicit(), None);
        assert_eq!(RawRanking::Int(9).explicit(), None);
        assert_eq!(RawRanking::Float(2.5).explicit(), None);
    }

    #[test]
    fn text_lists_split_on_newlines() {
        let t = TextList::Text("Rust basics\n\n  Cargo \n".into());
        assert_eq!(t.supplied().unwrap(), vec!["Rust basics", "Cargo"]);
        assert_eq!(TextList::Text("   ".into()).supplied(), None);
        assert_eq!(TextList::List(vec![]).supplied(), Some(vec![]));
    }

    #[test]
    fn resources_accept_json_strings() {
        let r = RawResources::Json(r#"[{"title":"Docs","url":"https://docs.rs","type":"docs"}]"#.into());
        let list = r.supplied().unwrap();
        assert_eq!(list[0].url, "https://docs.rs");
        assert_eq!(RawResources::Json("{broken".into()).supplied(), None);
    }

    #[test]
    fn decode_list_skips_non_records() {
        let posts: Vec<RawPost> = decode_list(json!([{ "slug": "a" }, 3, { "slug": "b" }])).unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert!(decode_list::<RawPost>(json!({ "code": "rest_no_route" })).is_err());
    }

    #[test]
    fn term_group_is_found_by_taxonomy() {
        let e: Embedded = serde_json::from_value(json!({
            "wp:term": [
                [{ "id": 1, "name": "KB", "slug": "knowledge-base", "taxonomy": "category" }],
                [{ "id": 9, "name": "Rust", "slug": "rust", "taxonomy": "post_tag" }]
            ]
        }))
        .unwrap();
        assert_eq!(e.term_group("post_tag")[0].name, "Rust");
        assert_eq!(e.term_group("category")[0].slug, "knowledge-base");
        assert!(e.term_group("genre").is_empty());
    }
}
