//! Pure enrichment functions: each derives one field of a `ContentItem` from
//! the raw record without touching any external state.

pub mod attachments;
pub mod category;
pub mod html;
pub mod ranking;
pub mod reading_time;
pub mod resources;
pub mod sections;

pub use attachments::{attachment_kind, extract_attachments, format_file_size};
pub use category::{categorize, category_from_keywords, category_from_tags};
pub use ranking::{compute_ranking, ContentSignals};
pub use reading_time::reading_time;
pub use resources::{classify_resource, extract_resources, OwnDomains};
pub use sections::{RegexSectionExtractor, SectionExtractor, StructuredSections};
