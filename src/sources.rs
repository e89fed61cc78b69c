//! Per-source activity report over a trailing window (`sources.json`).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::types::{NewsItem, SourceStat, SourcesReport};
use crate::utils::web::host_of;

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Group the window's articles by source key (lowercased source name, else
/// link domain, else `unknown`), tracking per source its count and most
/// recent article. Sorted by descending count, ties by key.
pub fn build_sources_report(
    items: &[NewsItem],
    now: DateTime<Utc>,
    window_days: i64,
) -> SourcesReport {
    let window_start = now - Duration::days(window_days);

    let mut stats: HashMap<String, SourceStat> = HashMap::new();

    for item in items {
        let ts = item.best_timestamp();
        if ts < window_start {
            continue;
        }

        let domain = host_of(&item.link).unwrap_or_else(|| "unknown".to_string());
        let display = if item.source.is_empty() {
            domain.clone()
        } else {
            item.source.clone()
        };
        let key = display.to_lowercase();

        let entry = stats.entry(key.clone()).or_insert_with(|| SourceStat {
            key,
            display,
            domain: domain.clone(),
            count: 0,
            last_dt: ts,
            last_title: item.title.clone(),
            last_link: item.link.clone(),
        });
        entry.count += 1;
        if ts > entry.last_dt {
            entry.last_dt = ts;
            entry.last_title = item.title.clone();
            entry.last_link = item.link.clone();
        }
    }

    let mut sources: Vec<SourceStat> = stats.into_values().collect();
    sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));

    debug!(total = items.len(), kept = sources.len(), "built sources report");

    SourcesReport {
        generated_at: now,
        window_days,
        sources,
    }
}
