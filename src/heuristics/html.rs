use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Drop every markup tag, keeping the text between them as-is.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Whitespace-separated tokens of the tag-stripped text.
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

pub fn has_code_blocks(html: &str) -> bool {
    html.contains("<pre") || html.contains("<code")
}

pub fn has_images(html: &str) -> bool {
    html.contains("<img")
}
