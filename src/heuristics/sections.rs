use std::sync::LazyLock;

use regex::Regex;

use super::html::strip_tags;

static PREREQUISITES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h[3-6][^>]*>\s*Prerrequisitos?\s*</h[3-6]>").expect("valid regex")
});
static OBJECTIVES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h[3-6][^>]*>\s*(?:Objetivos?|¿Qué aprenderás\?|Aprenderás)\s*</h[3-6]>")
        .expect("valid regex")
});
static NEXT_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h[2-6]").expect("valid regex"));
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredSections {
    pub prerequisites: Vec<String>,
    pub objectives: Vec<String>,
}

/// Best-effort extraction of the prerequisites/objectives lists from article
/// markup. Implementations must not fail; an unrecognized layout yields empty lists.
pub trait SectionExtractor: Send + Sync {
    fn extract(&self, html: &str) -> StructuredSections;
}

/// Looks for a `<h3>`..`<h6>` heading and collects the `<li>` items up to the
/// next heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSectionExtractor;

impl SectionExtractor for RegexSectionExtractor {
    fn extract(&self, html: &str) -> StructuredSections {
        StructuredSections {
            prerequisites: list_after(html, &PREREQUISITES_RE),
            objectives: list_after(html, &OBJECTIVES_RE),
        }
    }
}

fn list_after(html: &str, heading: &Regex) -> Vec<String> {
    let Some(m) = heading.find(html) else { return Vec::new() };
    let rest = &html[m.end()..];
    let end = NEXT_HEADING_RE.find(rest).map_or(rest.len(), |n| n.start());
    LIST_ITEM_RE
        .captures_iter(&rest[..end])
        .map(|cap| strip_tags(&cap[1]).trim().to_string())
        .collect()
}
