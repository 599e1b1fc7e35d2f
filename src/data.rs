use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

/// Source identifier. The CMS hands out integers; locally derived records
/// (inline attachments, fallback items) may use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentId {
    Num(u64),
    Text(String),
}

impl Default for ContentId {
    fn default() -> Self { ContentId::Num(0) }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentId::Num(n) => write!(f, "{n}"),
            ContentId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: "CODEVS Team".to_string(),
            bio: "Equipo de desarrollo de CODEVS".to_string(),
            avatar_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Frontend,
    Backend,
    Devops,
    Mobile,
    DataScience,
    AiMl,
    Security,
    Tools,
    BestPractices,
    Architecture,
    Databases,
    Cloud,
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Frontend,
        Category::Backend,
        Category::Devops,
        Category::Mobile,
        Category::DataScience,
        Category::AiMl,
        Category::Security,
        Category::Tools,
        Category::BestPractices,
        Category::Architecture,
        Category::Databases,
        Category::Cloud,
        Category::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Devops => "devops",
            Category::Mobile => "mobile",
            Category::DataScience => "data-science",
            Category::AiMl => "ai-ml",
            Category::Security => "security",
            Category::Tools => "tools",
            Category::BestPractices => "best-practices",
            Category::Architecture => "architecture",
            Category::Databases => "databases",
            Category::Cloud => "cloud",
            Category::Other => "other",
        }
    }

    /// Human readable name for listings.
    pub fn label(self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::Devops => "DevOps",
            Category::Mobile => "Mobile",
            Category::DataScience => "Data Science",
            Category::AiMl => "AI/ML",
            Category::Security => "Security",
            Category::Tools => "Tools",
            Category::BestPractices => "Best Practices",
            Category::Architecture => "Architecture",
            Category::Databases => "Databases",
            Category::Cloud => "Cloud",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL.into_iter().find(|c| c.slug().eq_ignore_ascii_case(s)).ok_or(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.slug()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Documentation,
    Tutorial,
    Repository,
    Video,
    Article,
    Tool,
    ExternalLink,
    Link,
}

impl ResourceKind {
    /// Maps a type string supplied by the CMS. Legacy spellings (`docs`,
    /// `github`) are folded in; anything unknown is a plain link.
    pub fn from_source(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "documentation" | "docs" => ResourceKind::Documentation,
            "tutorial" => ResourceKind::Tutorial,
            "repository" | "github" => ResourceKind::Repository,
            "video" => ResourceKind::Video,
            "article" => ResourceKind::Article,
            "tool" => ResourceKind::Tool,
            "external-link" => ResourceKind::ExternalLink,
            _ => ResourceKind::Link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentKind {
    Pdf,
    Image,
    Video,
    Audio,
    Text,
    Archive,
    Document,
    Spreadsheet,
    Presentation,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub size: String,
    pub mime_type: String,
}

/// Estimated reading time in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ReadingTime {
    pub minutes: u32,
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minutes {
            0 | 1 => f.write_str("< 1 min"),
            m if m < 60 => write!(f, "{m} min"),
            m if m % 60 == 0 => write!(f, "{}h", m / 60),
            m => write!(f, "{}h {}m", m / 60, m % 60),
        }
    }
}

impl Serialize for ReadingTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A normalized knowledge-base entry, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub slug: String,
    pub title: String,
    pub excerpt_html: String,
    pub content_html: String,
    pub published_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
    pub hero_image_url: Option<String>,
    pub ranking: u8,
    pub reading_time: ReadingTime,
    pub author: Author,
    pub category: Category,
    pub tags: Vec<String>,
    pub prerequisites: Vec<String>,
    pub objectives: Vec<String>,
    pub resources: Vec<Resource>,
    pub attachments: Vec<Attachment>,
}

impl ContentItem {
    /// `★★★☆☆` style rendering of the ranking.
    pub fn ranking_stars(&self) -> String {
        let filled = usize::from(self.ranking.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}
