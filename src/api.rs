use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawPost, RawTerm};

/// The remote CMS as seen by the service. `WpClient` talks HTTP; tests plug
/// in stubs.
#[async_trait]
pub trait CmsApi: Send + Sync {
    /// Items of the dedicated content type, related entities embedded.
    async fn list_custom(&self, per_page: u32) -> Result<Vec<RawPost>>;
    async fn find_custom_by_slug(&self, slug: &str) -> Result<Option<RawPost>>;
    async fn find_custom_by_id(&self, id: u64) -> Result<Option<RawPost>>;

    /// First taxonomy term with this slug.
    async fn resolve_term(&self, slug: &str) -> Result<Option<RawTerm>>;
    /// Generic posts filed under the term.
    async fn list_posts_in_term(&self, term_id: u64, per_page: u32) -> Result<Vec<RawPost>>;
    async fn find_post_by_slug(&self, slug: &str, term_id: u64) -> Result<Option<RawPost>>;
    async fn find_post_by_id(&self, id: u64) -> Result<Option<RawPost>>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<()>;
}
