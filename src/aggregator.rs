use std::collections::HashSet;
use std::sync::Arc;

use crate::api::CmsApi;
use crate::cache::{CacheStats, CachedValue, ContentCache};
use crate::config::Config;
use crate::data::ContentItem;
use crate::fallback;
use crate::mapping::Normalizer;
use crate::types::RawPost;

pub const ALL_ITEMS_KEY: &str = "all-knowledge-posts";

pub fn slug_key(slug: &str) -> String { format!("knowledge-post-slug-{slug}") }
pub fn id_key(id: u64) -> String { format!("knowledge-post-id-{id}") }

/// KnowledgeBase owns the CMS handle, the normalizer and the cache, and
/// provides the cached lookups. Nothing here returns an error: failed
/// sub-queries are logged and contribute nothing.
pub struct KnowledgeBase {
    api: Arc<dyn CmsApi>,
    normalizer: Normalizer,
    cache: ContentCache,
    term_slug: String,
    per_page: u32,
}

impl KnowledgeBase {
    pub fn new(api: Arc<dyn CmsApi>, config: &Config) -> Self {
        let normalizer = Normalizer::new(config.own_domains(), config.default_author.clone(), config.term_slug.clone());
        Self {
            api,
            normalizer,
            cache: ContentCache::new(config.cache_ttl(), config.sweep_probability),
            term_slug: config.term_slug.clone(),
            per_page: config.per_page(),
        }
    }

    /// Service over HTTP, as the binary wires it.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = crate::client::WpClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_cache(mut self, cache: ContentCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ContentCache { &self.cache }
    pub fn clear_cache(&self) { self.cache.clear() }
    pub fn cache_stats(&self) -> CacheStats { self.cache.stats() }

    /// Every knowledge-base entry from both sources, deduplicated by slug.
    pub async fn fetch_all(&self) -> Arc<Vec<ContentItem>> {
        if let Some(CachedValue::Items(items)) = self.cache.get(ALL_ITEMS_KEY) {
            tracing::debug!(key = ALL_ITEMS_KEY, count = items.len(), "cache hit");
            return items;
        }

        let (custom, generic) = futures::join!(self.custom_records(), self.term_records());
        let total = custom.len() + generic.len();
        let unique = dedup_by_slug(custom.into_iter().chain(generic));
        if unique.is_empty() {
            tracing::warn!("no knowledge base posts found in either source");
            return Arc::new(Vec::new());
        }

        let items: Arc<Vec<ContentItem>> = Arc::new(unique.iter().map(|p| self.normalizer.normalize(p)).collect());
        tracing::info!(unique = items.len(), total, "loaded knowledge base posts");
        self.cache.set(ALL_ITEMS_KEY, CachedValue::Items(items.clone()));
        items
    }

    pub async fn fetch_one(&self, slug: &str) -> Option<Arc<ContentItem>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return None;
        }
        let key = slug_key(slug);
        if let Some(CachedValue::Item(item)) = self.cache.get(&key) {
            tracing::debug!(slug, "cache hit");
            return Some(item);
        }

        let raw = match self.api.find_custom_by_slug(slug).await {
            Ok(Some(post)) => Some(post),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(slug, error = %e, "custom type lookup failed");
                None
            }
        };
        let raw = match raw {
            Some(post) => Some(post),
            None => self.term_post_by_slug(slug).await,
        };
        let Some(raw) = raw else {
            tracing::warn!(slug, "post not found in either source");
            return None;
        };
        Some(self.store(key, &raw))
    }

    pub async fn fetch_by_id(&self, id: u64) -> Option<Arc<ContentItem>> {
        let key = id_key(id);
        if let Some(CachedValue::Item(item)) = self.cache.get(&key) {
            tracing::debug!(id, "cache hit");
            return Some(item);
        }

        let raw = match self.api.find_custom_by_id(id).await {
            Ok(Some(post)) => Some(post),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(id, error = %e, "custom type lookup failed");
                None
            }
        };
        let raw = match raw {
            Some(post) => Some(post),
            None => self.term_post_by_id(id).await,
        };
        let Some(raw) = raw else {
            tracing::warn!(id, "post not found in either source");
            return None;
        };
        Some(self.store(key, &raw))
    }

    pub async fn ping(&self) -> bool {
        match self.api.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "CMS connection test failed");
                false
            }
        }
    }

    /// `fetch_all`, or the built-in sample items when the CMS does not answer.
    pub async fn fetch_all_with_fallback(&self) -> Arc<Vec<ContentItem>> {
        if !self.ping().await {
            tracing::warn!("serving fallback content");
            return Arc::new(fallback::sample_items());
        }
        self.fetch_all().await
    }

    fn store(&self, key: String, raw: &RawPost) -> Arc<ContentItem> {
        let item = Arc::new(self.normalizer.normalize(raw));
        self.cache.set(key, CachedValue::Item(item.clone()));
        item
    }

    async fn custom_records(&self) -> Vec<RawPost> {
        match self.api.list_custom(self.per_page).await {
            Ok(posts) => {
                tracing::info!(count = posts.len(), "custom type posts");
                posts
            }
            Err(e) => {
                tracing::warn!(error = %e, "custom type unavailable");
                Vec::new()
            }
        }
    }

    async fn term_id(&self) -> Option<u64> {
        match self.api.resolve_term(&self.term_slug).await {
            Ok(Some(term)) => Some(term.id),
            Ok(None) => {
                tracing::warn!(term = %self.term_slug, "knowledge base term not found");
                None
            }
            Err(e) => {
                tracing::warn!(term = %self.term_slug, error = %e, "term lookup failed");
                None
            }
        }
    }

    async fn term_records(&self) -> Vec<RawPost> {
        let Some(term_id) = self.term_id().await else { return Vec::new() };
        match self.api.list_posts_in_term(term_id, self.per_page).await {
            Ok(posts) => {
                tracing::info!(count = posts.len(), term_id, "posts filed under the term");
                posts
            }
            Err(e) => {
                tracing::warn!(term_id, error = %e, "generic posts unavailable");
                Vec::new()
            }
        }
    }

    async fn term_post_by_slug(&self, slug: &str) -> Option<RawPost> {
        let term_id = self.term_id().await?;
        self.api.find_post_by_slug(slug, term_id).await.unwrap_or_else(|e| {
            tracing::warn!(slug, error = %e, "generic post lookup failed");
            None
        })
    }

    /// A generic post counts only if it is filed under the term, when both
    /// sides of that check are known.
    async fn term_post_by_id(&self, id: u64) -> Option<RawPost> {
        let post = self.api.find_post_by_id(id).await.unwrap_or_else(|e| {
            tracing::warn!(id, error = %e, "generic post lookup failed");
            None
        })?;
        let Some(categories) = post.categories.as_ref() else { return Some(post) };
        match self.term_id().await {
            Some(term_id) if !categories.contains(&term_id) => {
                tracing::debug!(id, term_id, "post is not filed under the knowledge base term");
                None
            }
            _ => Some(post),
        }
    }
}

/// Keeps the first record per slug. Records without a slug cannot be
/// addressed and are dropped.
fn dedup_by_slug(posts: impl IntoIterator<Item = RawPost>) -> Vec<RawPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|p| {
            let slug = p.slug.trim();
            !slug.is_empty() && seen.insert(slug.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SourceError};
    use crate::types::{RawTerm, Rendered};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn post(id: u64, slug: &str, title: &str) -> RawPost {
        RawPost {
            id: crate::data::ContentId::Num(id),
            slug: slug.to_string(),
            title: Rendered { rendered: title.to_string() },
            ..RawPost::default()
        }
    }

    fn down() -> SourceError { SourceError::Transport("connection refused".into()) }

    #[derive(Default)]
    struct Stub {
        custom: Option<Vec<RawPost>>,
        term: Option<RawTerm>,
        generic: Option<Vec<RawPost>>,
        online: bool,
        calls: AtomicUsize,
    }

    impl Stub {
        fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
        fn hit(&self) { self.calls.fetch_add(1, Ordering::SeqCst); }
        fn term(id: u64) -> Option<RawTerm> {
            Some(RawTerm { id, slug: "knowledge-base".into(), taxonomy: "category".into(), ..RawTerm::default() })
        }
    }

    #[async_trait]
    impl CmsApi for Stub {
        async fn list_custom(&self, _per_page: u32) -> Result<Vec<RawPost>> {
            self.hit();
            self.custom.clone().ok_or_else(down)
        }
        async fn find_custom_by_slug(&self, slug: &str) -> Result<Option<RawPost>> {
            self.hit();
            let list = self.custom.as_ref().ok_or_else(down)?;
            Ok(list.iter().find(|p| p.slug == slug).cloned())
        }
        async fn find_custom_by_id(&self, id: u64) -> Result<Option<RawPost>> {
            self.hit();
            let list = self.custom.as_ref().ok_or_else(down)?;
            Ok(list.iter().find(|p| p.id == crate::data::ContentId::Num(id)).cloned())
        }
        async fn resolve_term(&self, _slug: &str) -> Result<Option<RawTerm>> {
            self.hit();
            Ok(self.term.clone())
        }
        async fn list_posts_in_term(&self, _term_id: u64, _per_page: u32) -> Result<Vec<RawPost>> {
            self.hit();
            self.generic.clone().ok_or_else(down)
        }
        async fn find_post_by_slug(&self, slug: &str, _term_id: u64) -> Result<Option<RawPost>> {
            self.hit();
            let list = self.generic.as_ref().ok_or_else(down)?;
            Ok(list.iter().find(|p| p.slug == slug).cloned())
        }
        async fn find_post_by_id(&self, id: u64) -> Result<Option<RawPost>> {
            self.hit();
            let list = self.generic.as_ref().ok_or_else(down)?;
            Ok(list.iter().find(|p| p.id == crate::data::ContentId::Num(id)).cloned())
        }
        async fn ping(&self) -> Result<()> {
            if self.online { Ok(()) } else { Err(down()) }
        }
    }

    fn service(stub: Stub) -> (KnowledgeBase, Arc<Stub>) {
        let stub = Arc::new(stub);
        let cfg = Config { sweep_probability: 0.0, ..Config::default() };
        (KnowledgeBase::new(stub.clone(), &cfg), stub)
    }

    #[tokio::test]
    async fn custom_type_wins_slug_collisions() {
        let (kb, _) = service(Stub {
            custom: Some(vec![post(1, "hooks", "Hooks (custom)"), post(2, "css-grid", "Grid")]),
            term: Stub::term(7),
            generic: Some(vec![post(10, "hooks", "Hooks (post)"), post(11, "docker", "Docker")]),
            ..Stub::default()
        });
        let items = kb.fetch_all().await;
        let slugs: Vec<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hooks", "css-grid", "docker"]);
        assert_eq!(items[0].title, "Hooks (custom)");
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let (kb, stub) = service(Stub {
            custom: Some(vec![post(1, "a", "A")]),
            term: Stub::term(7),
            generic: Some(vec![]),
            ..Stub::default()
        });
        let first = kb.fetch_all().await;
        let calls = stub.calls();
        let second = kb.fetch_all().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(stub.calls(), calls);
        assert_eq!(kb.cache_stats().keys, vec![ALL_ITEMS_KEY.to_string()]);
    }

    #[tokio::test]
    async fn one_failed_source_still_yields_the_other() {
        let (kb, _) = service(Stub { custom: None, term: Stub::term(7), generic: Some(vec![post(3, "b", "B")]), ..Stub::default() });
        assert_eq!(kb.fetch_all().await.len(), 1);
    }

    #[tokio::test]
    async fn both_sources_down_yields_empty_and_is_not_cached() {
        let (kb, stub) = service(Stub::default());
        assert!(kb.fetch_all().await.is_empty());
        let calls = stub.calls();
        assert!(kb.fetch_all().await.is_empty());
        assert!(stub.calls() > calls);
        assert_eq!(kb.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn missing_term_skips_generic_posts() {
        let (kb, _) = service(Stub {
            custom: Some(vec![post(1, "a", "A")]),
            term: None,
            generic: Some(vec![post(3, "b", "B")]),
            ..Stub::default()
        });
        let items = kb.fetch_all().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "a");
    }

    #[tokio::test]
    async fn fetch_one_falls_back_to_generic_posts() {
        let (kb, stub) = service(Stub {
            custom: Some(vec![]),
            term: Stub::term(7),
            generic: Some(vec![post(3, "docker", "Docker")]),
            ..Stub::default()
        });
        let item = kb.fetch_one("docker").await.unwrap();
        assert_eq!(item.title, "Docker");
        let calls = stub.calls();
        let again = kb.fetch_one("docker").await.unwrap();
        assert!(Arc::ptr_eq(&item, &again));
        assert_eq!(stub.calls(), calls);
    }

    #[tokio::test]
    async fn fetch_one_survives_transport_failure() {
        let (kb, _) = service(Stub { term: Stub::term(7), generic: Some(vec![post(3, "x", "X")]), ..Stub::default() });
        assert!(kb.fetch_one("x").await.is_some());
        assert!(kb.fetch_one("   ").await.is_none());
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let (kb, stub) = service(Stub { custom: Some(vec![]), term: Stub::term(7), generic: Some(vec![]), ..Stub::default() });
        assert!(kb.fetch_one("nope").await.is_none());
        let calls = stub.calls();
        assert!(kb.fetch_one("nope").await.is_none());
        assert!(stub.calls() > calls);
        assert_eq!(kb.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn fetch_by_id_checks_term_membership() {
        let mut inside = post(20, "inside", "Inside");
        inside.categories = Some(vec![7, 1]);
        let mut outside = post(21, "outside", "Outside");
        outside.categories = Some(vec![1]);
        let unfiled = post(22, "unfiled", "Unfiled");
        let (kb, _) = service(Stub {
            custom: Some(vec![post(5, "custom", "Custom")]),
            term: Stub::term(7),
            generic: Some(vec![inside, outside, unfiled]),
            ..Stub::default()
        });
        assert_eq!(kb.fetch_by_id(5).await.unwrap().slug, "custom");
        assert_eq!(kb.fetch_by_id(20).await.unwrap().slug, "inside");
        assert!(kb.fetch_by_id(21).await.is_none());
        assert_eq!(kb.fetch_by_id(22).await.unwrap().slug, "unfiled");
        assert!(kb.cache_stats().keys.contains(&id_key(20)));
    }

    #[tokio::test]
    async fn unreachable_cms_serves_fallback() {
        let (kb, stub) = service(Stub::default());
        let items = kb.fetch_all_with_fallback().await;
        assert_eq!(*items, fallback::sample_items());
        assert_eq!(stub.calls(), 0);
        assert_eq!(kb.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn reachable_cms_skips_fallback() {
        let (kb, _) = service(Stub {
            custom: Some(vec![post(1, "a", "A")]),
            term: Stub::term(7),
            generic: Some(vec![]),
            online: true,
            ..Stub::default()
        });
        let items = kb.fetch_all_with_fallback().await;
        assert_eq!(items.len(), 1);
        assert!(kb.ping().await);
    }

    #[tokio::test]
    async fn clear_cache_forces_refetch() {
        let (kb, stub) = service(Stub { custom: Some(vec![post(1, "a", "A")]), ..Stub::default() });
        kb.fetch_all().await;
        kb.clear_cache();
        let calls = stub.calls();
        kb.fetch_all().await;
        assert!(stub.calls() > calls);
    }

    #[test]
    fn dedup_drops_blank_slugs() {
        let out = dedup_by_slug(vec![post(1, "", "x"), post(2, "a", "A"), post(3, "a", "B")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.rendered, "A");
    }
}
