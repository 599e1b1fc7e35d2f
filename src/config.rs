use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::data::Author;
use crate::heuristics::OwnDomains;

const CONFIG_FILE: &str = "kbcontent.toml";
/// The REST API refuses larger pages.
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root of the CMS, e.g. `https://cms.example.com`.
    pub base_url: String,
    pub api_root: String,
    /// Route of the dedicated content type.
    pub custom_type: String,
    /// Category slug that files generic posts into the knowledge base.
    pub term_slug: String,
    pub per_page: u32,
    pub request_timeout_ms: u64,
    pub cache_ttl_secs: u64,
    pub sweep_probability: f64,
    /// Hosts whose links are not listed as external resources.
    pub own_domains: Vec<String>,
    pub default_author: Author,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8881".to_string(),
            api_root: "/wp-json/wp/v2".to_string(),
            custom_type: "knowledge-base".to_string(),
            term_slug: "knowledge-base".to_string(),
            per_page: MAX_PER_PAGE,
            request_timeout_ms: 8_000,
            cache_ttl_secs: 5 * 60,
            sweep_probability: 0.1,
            own_domains: vec!["localhost".to_string(), "codevs.com".to_string()],
            default_author: Author::default(),
        }
    }
}

impl Config {
    /// Explicit file, else `kbcontent.toml` in the platform config dir if it
    /// exists, else defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_path().filter(|p| p.exists()),
        };
        let mut cfg = match file {
            Some(p) => {
                let text = std::fs::read_to_string(&p)
                    .with_context(|| format!("reading config: {}", p.display()))?;
                Self::from_toml_str(&text).with_context(|| format!("parsing config: {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text)?;
        Ok(cfg)
    }

    /// `KB_BASE_URL`, `KB_CACHE_TTL_SECS`, `KB_REQUEST_TIMEOUT_MS`.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = lookup("KB_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = v.trim().to_string();
        }
        if let Some(v) = lookup("KB_CACHE_TTL_SECS").and_then(|s| s.trim().parse().ok()) {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = lookup("KB_REQUEST_TIMEOUT_MS").and_then(|s| s.trim().parse().ok()) {
            self.request_timeout_ms = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url).with_context(|| format!("invalid base_url: {}", self.base_url))?;
        anyhow::ensure!(!self.custom_type.trim().is_empty(), "custom_type must not be empty");
        anyhow::ensure!(!self.term_slug.trim().is_empty(), "term_slug must not be empty");
        Ok(())
    }

    /// `{base_url}{api_root}` without a trailing slash.
    pub fn api_base(&self) -> String {
        let root = self.api_root.trim_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), root)
    }

    pub fn per_page(&self) -> u32 { self.per_page.clamp(1, MAX_PER_PAGE) }

    pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms.max(1)) }

    pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

    /// Configured own domains plus the CMS host itself.
    pub fn own_domains(&self) -> OwnDomains {
        let cms_host = Url::parse(&self.base_url).ok().and_then(|u| u.host_str().map(str::to_string));
        OwnDomains::new(self.own_domains.iter().cloned().chain(cms_host))
    }
}

pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "kbcontent", "kbcontent").map(|p| p.config_dir().join(CONFIG_FILE))
}
