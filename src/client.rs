use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::api::CmsApi;
use crate::config::Config;
use crate::error::{Result, SourceError};
use crate::types::{decode_list, RawPost, RawTerm};

const TERMS_ROUTE: &str = "categories";
const POSTS_ROUTE: &str = "posts";

/// `CmsApi` over the CMS REST API.
#[derive(Debug, Clone)]
pub struct WpClient {
    http: reqwest::Client,
    api_base: String,
    custom_type: String,
}

impl WpClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("kbcontent/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, config.api_base(), config.custom_type.trim_matches('/')))
    }

    /// Use a preconfigured client. `api_base` is the REST root, e.g.
    /// `https://cms.example.com/wp-json/wp/v2`.
    pub fn with_client(http: reqwest::Client, api_base: impl Into<String>, custom_type: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            custom_type: custom_type.into(),
        }
    }

    fn route(&self, route: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.api_base, route);
        Url::parse(&raw).map_err(|e| SourceError::Transport(format!("invalid endpoint {raw}: {e}")))
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        tracing::debug!(%url, "GET");
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status { status: status.as_u16(), url: url.to_string() });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn list(&self, url: Url) -> Result<Vec<RawPost>> {
        decode_list(self.get_json(url).await?)
    }

    async fn first(&self, url: Url) -> Result<Option<RawPost>> {
        Ok(self.list(url).await?.into_iter().next())
    }

    /// Single-record routes answer 404 for unknown ids. Collection routes keep
    /// the `NotFound` error (unknown custom type, missing REST root).
    async fn single(&self, url: Url) -> Result<Option<RawPost>> {
        match self.get_json(url).await {
            Ok(body) => Ok(Some(serde_json::from_value(body)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CmsApi for WpClient {
    async fn list_custom(&self, per_page: u32) -> Result<Vec<RawPost>> {
        let mut url = self.route(&self.custom_type)?;
        url.query_pairs_mut().append_key_only("_embed").append_pair("per_page", &per_page.to_string());
        self.list(url).await
    }

    async fn find_custom_by_slug(&self, slug: &str) -> Result<Option<RawPost>> {
        let mut url = self.route(&self.custom_type)?;
        url.query_pairs_mut().append_pair("slug", slug).append_key_only("_embed");
        self.first(url).await
    }

    async fn find_custom_by_id(&self, id: u64) -> Result<Option<RawPost>> {
        let mut url = self.route(&format!("{}/{}", self.custom_type, id))?;
        url.query_pairs_mut().append_key_only("_embed");
        self.single(url).await
    }

    async fn resolve_term(&self, slug: &str) -> Result<Option<RawTerm>> {
        let mut url = self.route(TERMS_ROUTE)?;
        url.query_pairs_mut().append_pair("slug", slug);
        let terms: Vec<RawTerm> = decode_list(self.get_json(url).await?)?;
        Ok(terms.into_iter().next())
    }

    async fn list_posts_in_term(&self, term_id: u64, per_page: u32) -> Result<Vec<RawPost>> {
        let mut url = self.route(POSTS_ROUTE)?;
        url.query_pairs_mut()
            .append_pair("categories", &term_id.to_string())
            .append_key_only("_embed")
            .append_pair("per_page", &per_page.to_string());
        self.list(url).await
    }

    async fn find_post_by_slug(&self, slug: &str, term_id: u64) -> Result<Option<RawPost>> {
        let mut url = self.route(POSTS_ROUTE)?;
        url.query_pairs_mut()
            .append_pair("slug", slug)
            .append_pair("categories", &term_id.to_string())
            .append_key_only("_embed");
        self.first(url).await
    }

    async fn find_post_by_id(&self, id: u64) -> Result<Option<RawPost>> {
        let mut url = self.route(&format!("{POSTS_ROUTE}/{id}"))?;
        url.query_pairs_mut().append_key_only("_embed");
        self.single(url).await
    }

    async fn ping(&self) -> Result<()> {
        let mut url = self.route(POSTS_ROUTE)?;
        url.query_pairs_mut().append_pair("per_page", "1");
        self.get_json(url).await.map(|_| ())
    }
}
