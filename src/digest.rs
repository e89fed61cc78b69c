//! The summarize stage: assign canonical categories to every article and
//! derive the per-run digest (category tally, scam alerts, summary text).

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::classifier::{classify, Category};
use crate::oracle::Oracle;
use crate::types::{CategoryCount, Digest, NewsItem};
use crate::utils::is_today;

/// Alerting terms, deliberately separate from the Safety & Scams rule set:
/// this list flags articles for the alert box no matter which bucket they
/// land in.
const SCAM_WORDS: &[&str] = &[
    "scam",
    "fraud",
    "phishing",
    "impersonation",
    "robocall",
    "spoof",
    "identity theft",
    "elder abuse",
];

const MAX_ALERTS: usize = 10;

/// How many items feed the aggregate line of the deterministic summary.
const SUMMARY_SAMPLE: usize = 40;
const SUMMARY_HEADLINES: usize = 6;

/// Classify every item and build the digest. Items are mutated in place:
/// `category` is always overwritten with the rule-derived bucket, and
/// `subcategory` carries the oracle's raw proposal when one exists (the
/// bucket label otherwise).
///
/// The oracle is best-effort on both calls; any failure is logged and the
/// batch completes on rules alone.
pub async fn build_digest(items: &mut [NewsItem], oracle: Option<&dyn Oracle>) -> Digest {
    let suggestions = match oracle {
        Some(o) => match o.suggest_labels(items).await {
            Ok(map) => map,
            Err(e) => {
                warn!(oracle = o.name(), error = %e, "label suggestions failed, proceeding with rules only");
                HashMap::new()
            }
        },
        None => HashMap::new(),
    };

    for item in items.iter_mut() {
        let bucket = classify(&item.title, &item.summary, &item.source, &item.link);
        item.subcategory = Some(
            suggestions
                .get(&item.id)
                .cloned()
                .unwrap_or_else(|| bucket.label().to_string()),
        );
        item.category = Some(bucket);
    }

    let category_counts = category_counts(items);

    // Prefer today's articles as summary input when any exist.
    let todays: Vec<NewsItem> = items
        .iter()
        .filter(|it| is_today(it.best_timestamp()))
        .cloned()
        .collect();
    let pool: &[NewsItem] = if todays.is_empty() { items } else { &todays };

    let summary = match oracle {
        Some(o) => match o.summarize(pool).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => summary_fallback(pool),
            Err(e) => {
                warn!(oracle = o.name(), error = %e, "summary generation failed, using fallback");
                summary_fallback(pool)
            }
        },
        None => summary_fallback(pool),
    };

    let alerts = scam_alerts(items);

    info!(
        items = items.len(),
        buckets = category_counts.len(),
        alerts = alerts.len(),
        "digest built"
    );

    Digest {
        generated: Utc::now(),
        summary,
        alerts,
        category_counts,
    }
}

/// Tally categories over the classified set, ordered by descending count
/// with ties broken by label.
pub fn category_counts(items: &[NewsItem]) -> Vec<CategoryCount> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for item in items {
        let bucket = item
            .category
            .unwrap_or_else(|| classify(&item.title, &item.summary, &item.source, &item.link));
        *counts.entry(bucket).or_insert(0) += 1;
    }

    let mut ordered: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    ordered.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.label().cmp(b.category.label()))
    });
    ordered
}

/// Articles whose title+summary contains a scam-indicator term, in input
/// order, capped at [`MAX_ALERTS`]. Looser than the Safety & Scams bucket by
/// design and never reordered.
pub fn scam_alerts(items: &[NewsItem]) -> Vec<NewsItem> {
    items
        .iter()
        .filter(|it| {
            let text = format!("{} {}", it.title, it.summary).to_lowercase();
            SCAM_WORDS.iter().any(|w| text.contains(w))
        })
        .take(MAX_ALERTS)
        .cloned()
        .collect()
}

/// Deterministic summary: one aggregate line over the leading sample, then a
/// few recent headlines. Needs no network and always succeeds.
pub fn summary_fallback(items: &[NewsItem]) -> String {
    let sample = &items[..items.len().min(SUMMARY_SAMPLE)];
    let counts = category_counts(sample);
    let parts: Vec<String> = counts
        .iter()
        .map(|cc| format!("{}: {}", cc.category.label(), cc.count))
        .collect();

    let mut lines = vec![format!(
        "Today’s senior news at a glance — {}.",
        parts.join("; ")
    )];
    for item in items.iter().take(SUMMARY_HEADLINES) {
        let title = item.title.trim();
        if !title.is_empty() {
            lines.push(format!("- {} ({})", title, item.source.trim()));
        }
    }
    lines.join("\n")
}
