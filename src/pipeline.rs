//! Stage orchestration: fetch → summarize → sources → site.
//!
//! Each stage reads and writes the JSON documents in the data directory, so
//! stages can run individually (the scheduler invokes them as subcommands)
//! or back to back.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PipelineConfig;
use crate::digest::build_digest;
use crate::fetcher::Fetcher;
use crate::filter::{self, FilterMode};
use crate::oracle::Oracle;
use crate::parser::parse_feed;
use crate::site;
use crate::sources::{build_sources_report, DEFAULT_WINDOW_DAYS};
use crate::store::DataStore;
use crate::types::{Digest, ItemsDocument, NewsItem, ParsedEntry, Result};
use crate::utils::{stable_id, text};

const TITLE_MAX_CHARS: usize = 240;
const SUMMARY_MAX_CHARS: usize = 1200;

pub struct Pipeline {
    config: PipelineConfig,
    store: DataStore,
    fetcher: Fetcher,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = DataStore::new(config.data_dir.clone());
        let fetcher = Fetcher::new(config.fetch.clone());
        Self {
            config,
            store,
            fetcher,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Fetch all configured feeds (plus the optional one-off URL), filter,
    /// dedupe, and persist the items document. Individual feed failures are
    /// logged and skipped; the run always completes.
    pub async fn fetch(&self) -> Result<usize> {
        let feeds = self.config.feed_list()?;
        let now = Utc::now();
        let mut collected: Vec<NewsItem> = Vec::new();

        for url in &feeds {
            match self.ingest_feed(url, now, &mut collected).await {
                Ok(added) => debug!(url, added, "feed ingested"),
                Err(e) => warn!(url, error = %e, "feed failed, continuing"),
            }
        }

        if let Some(extra) = self.config.extra_url.clone() {
            self.ingest_extra_url(&extra, now, &mut collected).await;
        }

        let items = dedupe_and_sort(collected);
        let count = items.len();
        self.store
            .save_items(&ItemsDocument {
                updated: Some(now),
                items,
            })
            .await?;
        info!(count, feeds = feeds.len(), "fetch complete");
        Ok(count)
    }

    /// Classify the stored items and write both documents back. The oracle
    /// is optional and strictly advisory.
    pub async fn summarize(&self, oracle: Option<&dyn Oracle>) -> Result<Digest> {
        let mut document = self.store.load_items().await?;
        let digest = build_digest(&mut document.items, oracle).await;
        self.store.save_items(&document).await?;
        self.store.save_digest(&digest).await?;
        info!(
            items = document.items.len(),
            buckets = digest.category_counts.len(),
            "summarize complete"
        );
        Ok(digest)
    }

    /// Render the static site from the stored documents.
    pub async fn build_site(&self) -> Result<()> {
        let document = self.store.load_items().await?;
        let digest = self.store.load_digest().await?;
        site::build_site(&document.items, &digest, &self.config.site_dir).await
    }

    /// Write the per-source activity report.
    pub async fn sources(&self) -> Result<usize> {
        let document = self.store.load_items().await?;
        let report = build_sources_report(&document.items, Utc::now(), DEFAULT_WINDOW_DAYS);
        let count = report.sources.len();
        self.store.save_sources(&report).await?;
        Ok(count)
    }

    /// The full scheduled run.
    pub async fn run(&self, oracle: Option<&dyn Oracle>) -> Result<()> {
        self.fetch().await?;
        self.summarize(oracle).await?;
        self.sources().await?;
        self.build_site().await?;
        Ok(())
    }

    async fn ingest_feed(
        &self,
        url: &str,
        now: DateTime<Utc>,
        out: &mut Vec<NewsItem>,
    ) -> Result<usize> {
        let body = self.fetcher.fetch_text(url).await?;
        let feed = parse_feed(&body)?;
        let source = feed.title.unwrap_or_default();
        let before = out.len();
        for entry in feed.entries {
            if let Some(item) = item_from_entry(entry, &source, now, self.config.filter_mode) {
                out.push(item);
            }
        }
        Ok(out.len() - before)
    }

    /// One-off URL handling: the body may itself be a feed, may advertise
    /// one via autodiscovery, or is treated as a single article page.
    /// Failure here never fails the run.
    async fn ingest_extra_url(&self, url: &str, now: DateTime<Utc>, out: &mut Vec<NewsItem>) {
        let body = match self.fetcher.fetch_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "failed to fetch extra URL");
                return;
            }
        };

        if let Ok(feed) = parse_feed(&body) {
            let source = feed.title.unwrap_or_default();
            for entry in feed.entries {
                if let Some(item) = item_from_entry(entry, &source, now, self.config.filter_mode) {
                    out.push(item);
                }
            }
            return;
        }

        if let Some(feed_url) = discover_feed_url(&body, url) {
            info!(url, feed_url = %feed_url, "discovered feed on extra URL");
            if let Err(e) = self.ingest_feed(&feed_url, now, out).await {
                warn!(feed_url = %feed_url, error = %e, "discovered feed failed");
            }
            return;
        }

        match extract_page_item(&body, url, now, self.config.filter_mode) {
            Some(item) => out.push(item),
            None => warn!(url, "extra URL produced no usable item"),
        }
    }
}

/// Convert a parsed entry to a stored item: trim and bound the text fields,
/// strip summary HTML, apply the language and topic gates, and derive the
/// stable id. `None` means the entry was filtered out.
pub fn item_from_entry(
    entry: ParsedEntry,
    source: &str,
    fetched: DateTime<Utc>,
    mode: FilterMode,
) -> Option<NewsItem> {
    let title = text::truncate_chars(entry.title.trim(), TITLE_MAX_CHARS);
    let summary_raw = entry.summary.unwrap_or_default();
    let summary = text::truncate_chars(&text::strip_html(&summary_raw), SUMMARY_MAX_CHARS);
    let link = entry.link.unwrap_or_default().trim().to_string();

    let content_text = format!("{title}\n\n{summary}");
    if !filter::is_english(&content_text) {
        return None;
    }
    if !filter::matches_topic(mode, &content_text) {
        return None;
    }

    let seed = if !link.is_empty() {
        link.clone()
    } else if !title.is_empty() {
        title.clone()
    } else {
        entry.published.map(|d| d.to_rfc3339()).unwrap_or_default()
    };

    Some(NewsItem {
        id: stable_id(&seed),
        title,
        summary,
        link,
        source: source.trim().to_string(),
        published: entry.published,
        fetched,
        category: None,
        subcategory: None,
    })
}

/// Dedupe by link (id fallback), first occurrence wins, then order newest
/// first. Stable sort, so equal timestamps keep their fetch order.
pub fn dedupe_and_sort(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut unique: Vec<NewsItem> = Vec::with_capacity(items.len());
    for item in items {
        let key = if item.link.is_empty() {
            item.id.clone()
        } else {
            item.link.clone()
        };
        if seen.insert(key) {
            unique.push(item);
        }
    }
    unique.sort_by(|a, b| b.best_timestamp().cmp(&a.best_timestamp()));
    unique
}

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel]").expect("valid link selector"));
static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("valid meta selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// Find an RSS/Atom alternate link in an HTML page, resolved against the
/// page URL.
pub fn discover_feed_url(html: &str, base: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let base_url = Url::parse(base).ok()?;

    for link in document.select(&LINK_SELECTOR) {
        let element = link.value();
        let rel = element.attr("rel").unwrap_or_default().to_ascii_lowercase();
        if !rel.split_whitespace().any(|r| r == "alternate") {
            continue;
        }
        let kind = element.attr("type").unwrap_or_default().to_ascii_lowercase();
        let Some(href) = element.attr("href") else {
            continue;
        };
        if kind.contains("rss") || kind.contains("atom") || href.ends_with(".xml") {
            if let Ok(resolved) = base_url.join(href) {
                return Some(resolved.to_string());
            }
        }
    }
    None
}

/// Build a single item from an article page: page title plus description
/// meta (paragraph text as a last resort), subject to the usual gates.
pub fn extract_page_item(
    html: &str,
    url: &str,
    fetched: DateTime<Utc>,
    mode: FilterMode,
) -> Option<NewsItem> {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "og:title")
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(|t| t.text().collect::<String>())
        })
        .map(|t| text::collapse_whitespace(&t))
        .unwrap_or_default();

    let summary = meta_content(&document, "description")
        .or_else(|| meta_content(&document, "og:description"))
        .unwrap_or_else(|| {
            document
                .select(&PARAGRAPH_SELECTOR)
                .map(|p| text::collapse_whitespace(&p.text().collect::<String>()))
                .filter(|p| !p.is_empty())
                .take(3)
                .collect::<Vec<_>>()
                .join(" ")
        });

    if title.is_empty() && summary.is_empty() {
        return None;
    }

    item_from_entry(
        ParsedEntry {
            title,
            summary: Some(summary),
            link: Some(url.to_string()),
            published: None,
        },
        "Custom URL",
        fetched,
        mode,
    )
}

fn meta_content(document: &Html, key: &str) -> Option<String> {
    for meta in document.select(&META_SELECTOR) {
        let element = meta.value();
        let matches = element.attr("property") == Some(key) || element.attr("name") == Some(key);
        if matches {
            if let Some(content) = element.attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}
