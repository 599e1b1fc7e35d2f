//! Knowledge-base content service for a headless CMS.
//!
//! `KnowledgeBase` pulls posts from two CMS collections, merges them, fills
//! in the metadata the CMS does not carry (category, ranking, reading time,
//! prerequisites, resources, attachments) and keeps the result in a short
//! lived in-memory cache.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod fallback;
pub mod heuristics;
pub mod mapping;
pub mod types;

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::KnowledgeBase;
    pub use crate::api::CmsApi;
    pub use crate::cache::{CacheStats, ContentCache};
    pub use crate::client::WpClient;
    pub use crate::config::Config;
    pub use crate::data::{
        Attachment, AttachmentKind, Author, Category, ContentId, ContentItem, ReadingTime, Resource, ResourceKind,
    };
    pub use crate::error::SourceError;
}

pub use aggregator::KnowledgeBase;
pub use config::Config;
pub use data::ContentItem;
pub use error::SourceError;
