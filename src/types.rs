use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Category;

/// A single article as produced by the fetch stage and enriched by the
/// summarize stage. Raw fetch output carries no `category`; the summarize
/// pass assigns (or overwrites) it on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable short hash derived from the link (title/timestamp fallback).
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default = "epoch")]
    pub fetched: DateTime<Utc>,
    /// Canonical bucket, always rule/hint derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Raw oracle suggestion, kept for display only. Never authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl NewsItem {
    /// Publication time when the feed provided one, ingestion time otherwise.
    pub fn best_timestamp(&self) -> DateTime<Utc> {
        self.published.unwrap_or(self.fetched)
    }
}

/// The persisted items document (`items.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemsDocument {
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

/// One entry of the digest's category tally, kept as an ordered list so the
/// presentation order (descending count, ties by label) survives
/// serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Per-run aggregate derived from the classified article set (`digest.json`).
/// It has no identity of its own and is recomputed from scratch every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub generated: DateTime<Utc>,
    pub summary: String,
    pub alerts: Vec<NewsItem>,
    pub category_counts: Vec<CategoryCount>,
}

impl Default for Digest {
    fn default() -> Self {
        Self {
            generated: epoch(),
            summary: String::new(),
            alerts: Vec::new(),
            category_counts: Vec::new(),
        }
    }
}

/// Per-source activity over the report window (`sources.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStat {
    pub key: String,
    pub display: String,
    pub domain: String,
    pub count: usize,
    pub last_dt: DateTime<Utc>,
    pub last_title: String,
    pub last_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesReport {
    pub generated_at: DateTime<Utc>,
    pub window_days: i64,
    pub sources: Vec<SourceStat>,
}

/// A feed after parsing, before conversion into [`NewsItem`]s.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug)]
pub struct ParsedEntry {
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
    /// Minimum spacing between requests to the same host.
    pub host_spacing_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "SeniorNewsDaily/0.1".to_string(),
            timeout_seconds: 25,
            max_retries: 2,
            retry_delay_seconds: 2,
            max_redirects: 5,
            host_spacing_ms: 150,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feeds file error: {0}")]
    FeedsFile(#[from] serde_yaml::Error),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
