use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::data::{Resource, ResourceKind};

static EXTERNAL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]+href="(https?://[^"]+)"[^>]*>([^<]+)</a>"#).expect("valid regex")
});

/// Hosts considered part of the site itself. Subdomains match too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnDomains {
    hosts: Vec<String>,
}

impl OwnDomains {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for h in hosts {
            let h = h.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
            if !h.is_empty() && !out.contains(&h) {
                out.push(h);
            }
        }
        Self { hosts: out }
    }

    pub fn hosts(&self) -> &[String] { &self.hosts }

    /// Unparsable URLs count as own so they are never listed as external.
    pub fn is_own(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_ascii_lowercase)) else {
            return true;
        };
        self.hosts.iter().any(|own| host == *own || host.ends_with(&format!(".{own}")))
    }
}

pub fn classify_resource(url: &str, title: &str) -> ResourceKind {
    let url = url.to_lowercase();
    let title = title.to_lowercase();
    let title_has = |words: &[&str]| words.iter().any(|w| title.contains(w));

    if url.contains("github.com") || title_has(&["github", "repositorio"]) {
        ResourceKind::Repository
    } else if url.contains("youtube.com") || url.contains("youtu.be") || url.contains("vimeo.com") || title_has(&["video"]) {
        ResourceKind::Video
    } else if url.contains("docs.") || title_has(&["documentación", "docs"]) {
        ResourceKind::Documentation
    } else if title_has(&["tutorial", "guía", "guide"]) {
        ResourceKind::Tutorial
    } else if title_has(&["herramienta", "tool", "app"]) {
        ResourceKind::Tool
    } else if title_has(&["artículo", "article", "blog"]) {
        ResourceKind::Article
    } else {
        ResourceKind::ExternalLink
    }
}

/// External `<a href>` links in the content, first occurrence per URL.
pub fn extract_resources(html: &str, own: &OwnDomains) -> Vec<Resource> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cap in EXTERNAL_LINK_RE.captures_iter(html) {
        let url = &cap[1];
        if own.is_own(url) || !seen.insert(url.to_string()) {
            continue;
        }
        let title = cap[2].trim();
        out.push(Resource { title: title.to_string(), url: url.to_string(), kind: classify_resource(url, title) });
    }
    out
}
