//! Rule-based article categorization.
//!
//! Every article gets exactly one canonical bucket. Buckets are decided by a
//! fixed, priority-ordered table of word-boundary regex rules over the
//! article's text fields, with a per-domain hint table as a weighted extra
//! signal. An optional LLM may *suggest* labels elsewhere in the pipeline,
//! but the value produced here is always the authoritative one, so a run is
//! reproducible with no network access at all.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// The closed set of canonical buckets. Declaration order is priority order:
/// when several buckets score equally, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Safety & Scams")]
    SafetyScams,
    #[serde(rename = "Social Security")]
    SocialSecurity,
    #[serde(rename = "Medicare")]
    Medicare,
    #[serde(rename = "Finance & Retirement")]
    FinanceRetirement,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Golf & Leisure")]
    GolfLeisure,
    #[serde(rename = "Cooking & Nutrition")]
    CookingNutrition,
    #[serde(rename = "Caregiving & LTC")]
    CaregivingLtc,
    #[serde(rename = "Aging Research")]
    AgingResearch,
    #[serde(rename = "Policy & Legislation")]
    PolicyLegislation,
    #[serde(rename = "General")]
    General,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::SafetyScams,
        Category::SocialSecurity,
        Category::Medicare,
        Category::FinanceRetirement,
        Category::Travel,
        Category::GolfLeisure,
        Category::CookingNutrition,
        Category::CaregivingLtc,
        Category::AgingResearch,
        Category::PolicyLegislation,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::SafetyScams => "Safety & Scams",
            Category::SocialSecurity => "Social Security",
            Category::Medicare => "Medicare",
            Category::FinanceRetirement => "Finance & Retirement",
            Category::Travel => "Travel",
            Category::GolfLeisure => "Golf & Leisure",
            Category::CookingNutrition => "Cooking & Nutrition",
            Category::CaregivingLtc => "Caregiving & LTC",
            Category::AgingResearch => "Aging Research",
            Category::PolicyLegislation => "Policy & Legislation",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword rules per bucket, highest priority first. "Safety & Scams" leads
/// because scam terms are high-value signals that must not be shadowed by
/// incidental overlap (a Medicare-fraud story is a scam story).
///
/// Kept as data so the table can be extended and tested apart from the
/// matching engine.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::SafetyScams,
        &[r"\b(scams?|fraud|phish(?:ing)?|robocalls?|spoof(?:ing)?|identity theft|elder abuse|smish(?:ing)?|vish(?:ing)?)\b"],
    ),
    (
        Category::SocialSecurity,
        &[
            r"\bsocial security\b",
            r"\bssa\b",
            r"\bssdi\b",
            r"\bssi\b",
            r"\bcola\b",
            r"\b(retire(?:ment)?|survivor|disability)\s+benefit(s)?\b",
            r"\brequired minimum distribution(s)?\b",
            r"\brmds?\b",
        ],
    ),
    (
        Category::Medicare,
        &[
            r"\bmedicare\b",
            r"\bmedicare advantage\b",
            r"\bpart\s*[abcd]\b",
            r"\bmedigap\b",
            r"\b(drug|rx|prescription)\b",
            r"\bpremium(s)?\b",
            r"\bdeductible(s)?\b",
            r"\bcms\b",
            r"\bprior authorization\b",
        ],
    ),
    (
        Category::FinanceRetirement,
        &[
            r"\bmoney\b",
            r"\bfinance\b",
            r"\bbudget(ing)?\b",
            r"\bsaving(s)?\b",
            r"\binvest(ing|ment|ments)?\b",
            r"\bannuit(y|ies)\b",
            r"\b401(k)?\b",
            r"\b403(b)\b",
            r"\bira(s)?\b",
            r"\broth\b",
            r"\bpension(s)?\b",
            r"\btax(es)?\b",
            r"\brmds?\b",
            r"\b(estate|legacy)\s+planning\b",
            r"\blong[-\s]?term\s+finances?\b",
        ],
    ),
    (
        Category::Travel,
        &[
            r"\btravel\b",
            r"\btrips?\b",
            r"\bvacations?\b",
            r"\btours?\b",
            r"\bhotels?\b",
            r"\bflights?\b",
            r"\bcruises?\b",
            r"\bdestinations?\b",
            r"\bitinerary\b",
        ],
    ),
    (
        Category::GolfLeisure,
        &[
            r"\bgolf(ing)?\b",
            r"\bpickleball\b",
            r"\bleisure\b",
            r"\bhobby\b",
            r"\brecreation\b",
            r"\bfitness\b",
            r"\bexercise\b",
            r"\bwalking\b",
        ],
    ),
    (
        Category::CookingNutrition,
        &[
            r"\bcook(ing)?\b",
            r"\brecipes?\b",
            r"\bnutrition(al)?\b",
            r"\bdiet(s|ary)?\b",
            r"\bfood\b",
            r"\bdining\b",
            r"\bmeal(s)?\b",
            r"\bkitchen\b",
            r"\bmeal\s+prep\b",
        ],
    ),
    (
        Category::CaregivingLtc,
        &[
            r"\bcaregiver(s)?\b",
            r"\bcaregiving\b",
            r"\bnursing\s+home(s)?\b",
            r"\blong[-\s]?term\s+care\b",
            r"\bltc\b",
            r"\brespite\b",
            r"\bhome\s+health\b",
        ],
    ),
    (
        Category::AgingResearch,
        &[
            r"\baging\b",
            r"\blongevity\b",
            r"\balzheim(?:er'?s)?\b",
            r"\bdementia\b",
            r"\bnia\b",
            r"\bnih\b",
            r"\bfalls?\b",
            r"\bclinical\s+trial(s)?\b",
            r"\bresearch\b",
        ],
    ),
    (
        Category::PolicyLegislation,
        &[
            r"\bbills?\b",
            r"\blegislation\b",
            r"\blaws?\b",
            r"\bcongress\b",
            r"\bregulation(s)?\b",
            r"\brule-?making\b",
            r"\bproposed rule\b",
            r"\bhhs\b",
            r"\bacl\b",
            r"\boig\b",
        ],
    ),
];

/// Hostname overrides, consulted as an extra weighted candidate when the
/// article links to a site whose beat is unambiguous.
const DOMAIN_HINTS: &[(&str, Category)] = &[
    // lifestyle
    ("golf.com", Category::GolfLeisure),
    ("travelandleisure.com", Category::Travel),
    ("epicurious.com", Category::CookingNutrition),
    // finance
    ("nerdwallet.com", Category::FinanceRetirement),
    ("cnbc.com", Category::FinanceRetirement),
    // senior policy/health
    ("kff.org", Category::Medicare),
    ("kffhealthnews.org", Category::Medicare),
    ("ssa.gov", Category::SocialSecurity),
    ("cms.gov", Category::Medicare),
    ("acl.gov", Category::CaregivingLtc),
    ("nia.nih.gov", Category::AgingResearch),
    ("cdc.gov", Category::AgingResearch),
    ("ftc.gov", Category::SafetyScams),
    ("justice.gov", Category::SafetyScams),
    ("hhs.gov", Category::PolicyLegislation),
    ("aarp.org", Category::FinanceRetirement),
];

/// Score a domain-hint candidate high enough to beat a weak single-pattern
/// match of any bucket, but not two matched patterns of a top bucket.
const DOMAIN_HINT_SCORE: u32 = 15;

static COMPILED_RULES: Lazy<Vec<(Category, Vec<Regex>)>> = Lazy::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|(bucket, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .expect("invalid category pattern")
                })
                .collect();
            (*bucket, compiled)
        })
        .collect()
});

/// Assign the canonical bucket for one article.
///
/// Total over its inputs: empty fields, malformed links, and arbitrary text
/// (including regex metacharacters, which only ever appear as haystack) all
/// produce a valid bucket, falling back to [`Category::General`].
///
/// Weighted scoring: each bucket at priority index `i` scores
/// `matched_patterns * (N - i)`, a matching domain hint enters the same
/// comparison at a fixed score, the highest total wins, and ties go to the
/// earlier bucket.
pub fn classify(title: &str, summary: &str, source: &str, link: &str) -> Category {
    let text = [title, summary, source]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let bucket_count = COMPILED_RULES.len() as u32;
    // (score, priority index, bucket); lower index wins ties.
    let mut best: Option<(u32, usize, Category)> = None;

    for (idx, (bucket, patterns)) in COMPILED_RULES.iter().enumerate() {
        let matched = patterns.iter().filter(|p| p.is_match(&text)).count() as u32;
        if matched == 0 {
            continue;
        }
        let score = matched * (bucket_count - idx as u32);
        offer(&mut best, score, idx, *bucket);
    }

    if let Some(hinted) = domain_hint(link) {
        offer(&mut best, DOMAIN_HINT_SCORE, COMPILED_RULES.len(), hinted);
    }

    best.map(|(_, _, bucket)| bucket).unwrap_or(Category::General)
}

fn offer(best: &mut Option<(u32, usize, Category)>, score: u32, idx: usize, bucket: Category) {
    match best {
        Some((top_score, top_idx, _)) if score < *top_score || (score == *top_score && idx >= *top_idx) => {}
        _ => *best = Some((score, idx, bucket)),
    }
}

/// Look up the hint table for the link's normalized hostname. Malformed or
/// empty links simply yield no hint.
fn domain_hint(link: &str) -> Option<Category> {
    let host = crate::utils::web::host_of(link)?;
    DOMAIN_HINTS
        .iter()
        .find(|(domain, _)| *domain == host)
        .map(|(_, bucket)| *bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scam_terms_outrank_medicare_terms() {
        assert_eq!(
            classify("Medicare scam targets seniors", "", "", ""),
            Category::SafetyScams
        );
    }

    #[test]
    fn word_boundaries_avoid_substring_hits() {
        // "Iranian" must not trigger the IRA pattern.
        assert_eq!(classify("Iranian diplomacy update", "", "", ""), Category::General);
        assert_eq!(classify("How to roll over an IRA", "", "", ""), Category::FinanceRetirement);
    }
}
