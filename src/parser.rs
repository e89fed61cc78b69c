//! RSS/Atom parsing into the pipeline's neutral entry shape.

use chrono::Utc;
use feed_rs::parser;
use tracing::debug;

use crate::types::{ParsedEntry, ParsedFeed, PipelineError, Result};

/// Parse raw feed XML. Entries keep whatever fields the feed provided;
/// normalization (HTML stripping, truncation, ids) happens downstream.
pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| PipelineError::Parse(format!("failed to parse feed: {e}")))?;

    let title = feed.title.map(|t| t.content);

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.clone());
            // Prefer the explicit summary, fall back to the content body.
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));
            let published = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc));

            ParsedEntry {
                title,
                summary,
                link,
                published,
            }
        })
        .collect::<Vec<_>>();

    debug!(count = entries.len(), "parsed feed entries");
    Ok(ParsedFeed { title, entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example Wire</title>
    <item>
      <title>COLA announcement expected</title>
      <link>https://example.org/cola</link>
      <description>Benefit checks may rise next year.</description>
      <pubDate>Mon, 03 Aug 2026 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Untimed item</title>
      <link>https://example.org/untimed</link>
      <description>No date on this one.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_titles_links_and_dates() {
        let feed = parse_feed(SAMPLE_RSS).expect("sample feed parses");
        assert_eq!(feed.title.as_deref(), Some("Example Wire"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.title, "COLA announcement expected");
        assert_eq!(first.link.as_deref(), Some("https://example.org/cola"));
        assert!(first.published.is_some());
        assert!(feed.entries[1].published.is_none());
    }

    #[test]
    fn garbage_input_is_a_parse_error() {
        assert!(parse_feed("this is not xml").is_err());
    }
}
