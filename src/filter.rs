//! Ingest-time filtering: topic keyword gates and a language gate.
//!
//! The topic filter decides whether a fetched entry belongs on the site at
//! all; the classifier later decides *where*. Three modes mirror how broad
//! the operator wants the site to be on a given run.

use tracing::debug;
use whatlang::Lang;

/// How aggressively fetched entries are filtered by topic keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Core senior/policy terms only.
    Strict,
    /// Core terms plus lifestyle terms.
    #[default]
    Loose,
    /// Accept everything the feeds deliver.
    None,
}

impl FilterMode {
    /// Parse the `FILTER_MODE` setting; unknown values fall back to loose.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => FilterMode::Strict,
            "none" => FilterMode::None,
            "loose" => FilterMode::Loose,
            other => {
                if !other.is_empty() {
                    debug!(value = other, "unknown filter mode, using loose");
                }
                FilterMode::Loose
            }
        }
    }
}

const STRICT_KEYS: &[&str] = &[
    "medicare",
    "medicaid",
    "social security",
    "ssa",
    "senior",
    "older adult",
    "retiree",
    "long-term care",
    "nursing home",
    "alzheim",
    "dementia",
    "caregiver",
    "ltc",
    "cola",
    "benefit",
    "scam",
    "fraud",
    "prescription",
    "drug",
    "rx",
    "price",
    "premium",
    "cms",
    "nia",
    "nih",
    "acl",
    "hhs",
];

const LIFESTYLE_KEYS: &[&str] = &[
    "golf",
    "pickleball",
    "leisure",
    "hobby",
    "recreation",
    "fitness",
    "walking",
    "exercise",
    "travel",
    "trip",
    "vacation",
    "tour",
    "hotel",
    "flight",
    "cruise",
    "destination",
    "cooking",
    "recipe",
    "nutrition",
    "diet",
    "food",
    "dining",
    "restaurant",
    "meal",
    "finance",
    "retirement",
    "retire",
    "annuity",
    "401k",
    "ira",
    "invest",
    "savings",
    "budget",
    "inflation",
];

/// Case-insensitive substring test against the mode's keyword list.
pub fn matches_topic(mode: FilterMode, text: &str) -> bool {
    if mode == FilterMode::None {
        return true;
    }
    let haystack = text.to_lowercase();
    let strict_hit = STRICT_KEYS.iter().any(|k| haystack.contains(k));
    match mode {
        FilterMode::Strict => strict_hit,
        FilterMode::Loose => strict_hit || LIFESTYLE_KEYS.iter().any(|k| haystack.contains(k)),
        FilterMode::None => true,
    }
}

/// Language gate: drop entries only when detection confidently reports a
/// non-English language. Short or ambiguous text is kept, detection never
/// errors out of the pipeline.
pub fn is_english(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    match whatlang::detect(trimmed) {
        Some(info) => info.lang() == Lang::Eng || !info.is_reliable(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_rejects_lifestyle_only_text() {
        let text = "Best golf courses to visit this fall";
        assert!(!matches_topic(FilterMode::Strict, text));
        assert!(matches_topic(FilterMode::Loose, text));
        assert!(matches_topic(FilterMode::None, text));
    }

    #[test]
    fn strict_terms_pass_every_mode() {
        let text = "Medicare premium changes announced";
        assert!(matches_topic(FilterMode::Strict, text));
        assert!(matches_topic(FilterMode::Loose, text));
    }

    #[test]
    fn mode_parsing_defaults_to_loose() {
        assert_eq!(FilterMode::parse("strict"), FilterMode::Strict);
        assert_eq!(FilterMode::parse("NONE"), FilterMode::None);
        assert_eq!(FilterMode::parse(""), FilterMode::Loose);
        assert_eq!(FilterMode::parse("whatever"), FilterMode::Loose);
    }

    #[test]
    fn empty_text_counts_as_english() {
        assert!(is_english(""));
        assert!(is_english("   "));
    }
}
