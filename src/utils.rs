use chrono::{DateTime, Utc};
use sha2::{Digest as _, Sha256};

/// Stable short identifier for an article: 16 hex chars of the hashed seed.
/// The seed is the link when present, with title/timestamp fallbacks, so
/// repeated runs assign the same id to the same story.
pub fn stable_id(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Whether a timestamp falls on the current UTC date.
pub fn is_today(ts: DateTime<Utc>) -> bool {
    ts.date_naive() == Utc::now().date_naive()
}

/// Text processing helpers shared by the filter and site stages.
pub mod text {
    use once_cell::sync::Lazy;
    use regex::Regex;
    use scraper::Html;

    static TAG_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

    /// Reduce an HTML fragment (feed summaries are frequently HTML) to
    /// whitespace-normalized plain text. Plain-text input passes through
    /// with only whitespace collapsing.
    pub fn strip_html(input: &str) -> String {
        if !TAG_LIKE.is_match(input) && !input.contains('&') {
            return collapse_whitespace(input);
        }
        let fragment = Html::parse_fragment(input);
        let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
        collapse_whitespace(&joined)
    }

    /// Truncate to at most `max_chars` characters without splitting a
    /// code point.
    pub fn truncate_chars(input: &str, max_chars: usize) -> String {
        match input.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => input[..byte_idx].to_string(),
            None => input.to_string(),
        }
    }

    pub fn collapse_whitespace(input: &str) -> String {
        input.split_whitespace().collect::<Vec<_>>().join(" ")
    }

}

/// URL helpers.
pub mod web {
    use url::Url;

    /// Lowercased hostname with any leading `www.` removed; `None` for
    /// malformed or empty input.
    pub fn host_of(link: &str) -> Option<String> {
        let url = Url::parse(link).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
    }

}
