//! Run configuration: directories from the CLI, behavior toggles from the
//! environment, and feed list composition.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::filter::FilterMode;
use crate::types::{FetchConfig, Result};

/// Trusted policy/health/senior sources, used when no feeds file exists.
pub const BASE_FEEDS: &[&str] = &[
    "https://press.aarp.org/rss",
    "https://www.kff.org/topic/medicare/feed/",
    "https://www.kff.org/topic/medicaid/feed/",
    "https://kffhealthnews.org/topic/aging/feed/",
    "https://www.ssa.gov/news/en/press/releases/index.rss",
    "https://oig.ssa.gov/rss/news-releases.xml",
    "https://www.cms.gov/about-cms/contact/newsroom/rss.xml",
    "https://acl.gov/news/rss.xml",
    "https://www.nia.nih.gov/news/rss.xml",
    "https://tools.cdc.gov/api/v2/resources/media/403372.rss",
    "https://www.consumerfinance.gov/about-us/blog/rss/",
    "https://www.ftc.gov/news-events/news/rss",
    "https://www.justice.gov/elderjustice/rss.xml",
    "https://www.hhs.gov/about/news/rss.xml",
];

/// Lifestyle additions (golf, travel, cooking, finance) appended when the
/// operator broadens the site.
pub const LIFESTYLE_FEEDS: &[&str] = &[
    "https://golf.com/feed/",
    "https://www.travelandleisure.com/rss",
    "https://www.epicurious.com/services/rss/feeds/latest.xml",
    "https://www.nerdwallet.com/blog/feed/",
    "https://www.cnbc.com/id/10000354/device/rss/rss.html",
    "https://feeds.npr.org/1001/rss.xml",
];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub site_dir: PathBuf,
    pub filter_mode: FilterMode,
    pub broaden_sites: bool,
    pub additional_feeds: Vec<String>,
    /// One-off URL to ingest this run (feed autodiscovery, else a single
    /// article extraction).
    pub extra_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub fetch: FetchConfig,
}

impl PipelineConfig {
    /// Read behavior toggles from the environment, the way the scheduled
    /// workflow wires them in:
    ///
    /// - `FILTER_MODE`: `none` | `loose` | `strict` (default `loose`)
    /// - `BROADEN_SITES`: truthy flag adding lifestyle feeds
    /// - `ADDITIONAL_FEEDS`: comma-separated feed URLs
    /// - `EXTRA_URL`: one-off RSS or article URL
    /// - `OPENAI_API_KEY` / `OPENAI_MODEL`: optional oracle credentials
    pub fn from_env(data_dir: PathBuf, site_dir: PathBuf) -> Self {
        let filter_mode = FilterMode::parse(&env::var("FILTER_MODE").unwrap_or_default());
        let broaden_sites = env_flag("BROADEN_SITES");
        let additional_feeds = env::var("ADDITIONAL_FEEDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        let extra_url = env::var("EXTRA_URL").ok().map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let openai_model = env::var("OPENAI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        Self {
            data_dir,
            site_dir,
            filter_mode,
            broaden_sites,
            additional_feeds,
            extra_url,
            openai_api_key,
            openai_model,
            fetch: FetchConfig::default(),
        }
    }

    /// Compose the feed list for this run: the feeds file when present, else
    /// the built-in base list; lifestyle feeds when broadened; then any extra
    /// feeds. Order-preserving dedup.
    pub fn feed_list(&self) -> Result<Vec<String>> {
        let mut feeds = load_feeds_file(&self.data_dir.join("feeds.yaml"))?;
        if feeds.is_empty() {
            feeds = BASE_FEEDS.iter().map(|s| s.to_string()).collect();
        } else {
            info!(count = feeds.len(), "loaded feed list from feeds.yaml");
        }
        if self.broaden_sites {
            feeds.extend(LIFESTYLE_FEEDS.iter().map(|s| s.to_string()));
        }
        feeds.extend(self.additional_feeds.iter().cloned());

        let mut seen = std::collections::HashSet::new();
        feeds.retain(|u| !u.is_empty() && seen.insert(u.clone()));
        debug!(count = feeds.len(), "composed feed list");
        Ok(feeds)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeedsFile {
    #[serde(default)]
    feeds: Vec<String>,
}

fn load_feeds_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let parsed: FeedsFile = serde_yaml::from_str(&raw)?;
    Ok(parsed
        .feeds
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
