use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use senior_news_daily::classifier::Category;
use senior_news_daily::oracle::{MockOracle, Oracle};
use senior_news_daily::types::{NewsItem, PipelineError, Result};
use senior_news_daily::{build_digest, category_counts, scam_alerts, summary_fallback};

fn item(id: &str, title: &str, summary: &str) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        link: String::new(),
        source: "Test Wire".to_string(),
        published: None,
        fetched: Utc::now(),
        category: None,
        subcategory: None,
    }
}

struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    async fn suggest_labels(&self, _items: &[NewsItem]) -> Result<HashMap<String, String>> {
        Err(PipelineError::Oracle("simulated timeout".to_string()))
    }

    async fn summarize(&self, _items: &[NewsItem]) -> Result<String> {
        Err(PipelineError::Oracle("simulated timeout".to_string()))
    }
}

#[tokio::test]
async fn oracle_suggestions_never_override_the_rule_bucket() {
    let mut items = vec![item(
        "a1",
        "Heart-healthy recipes for seniors",
        "Simple meal ideas for two.",
    )];

    let labels = HashMap::from([("a1".to_string(), "Lifestyle Piece".to_string())]);
    let oracle = MockOracle::new(labels, "ORACLE SUMMARY");

    let digest = build_digest(&mut items, Some(&oracle)).await;

    assert_eq!(items[0].category, Some(Category::CookingNutrition));
    assert_eq!(items[0].subcategory.as_deref(), Some("Lifestyle Piece"));
    assert_eq!(digest.summary, "ORACLE SUMMARY");
}

#[tokio::test]
async fn oracle_failure_degrades_to_rules_and_fallback_summary() {
    let mut items = vec![
        item("a1", "Medicare premium changes announced", "Details inside."),
        item("a2", "New phishing scam reported", "Robocalls on the rise."),
        item("a3", "Community bake sale announced", ""),
    ];

    let digest = build_digest(&mut items, Some(&FailingOracle)).await;

    for it in &items {
        let bucket = it.category.expect("every item is categorized");
        assert!(Category::ALL.contains(&bucket));
        // With no usable oracle output, the subcategory mirrors the bucket.
        assert_eq!(it.subcategory.as_deref(), Some(bucket.label()));
    }
    assert!(digest.summary.contains("at a glance"));
    assert_eq!(items[0].category, Some(Category::Medicare));
    assert_eq!(items[1].category, Some(Category::SafetyScams));
    assert_eq!(items[2].category, Some(Category::General));
}

#[tokio::test]
async fn rerunning_classification_yields_identical_labels() {
    let mut items = vec![
        item("a1", "Medicare premium changes announced", "Details inside."),
        item("a2", "Great walking tours of Europe", "Pack light."),
        item("a3", "Community bake sale announced", ""),
    ];

    build_digest(&mut items, None).await;
    let first: Vec<_> = items.iter().map(|it| it.category).collect();

    build_digest(&mut items, None).await;
    let second: Vec<_> = items.iter().map(|it| it.category).collect();

    assert_eq!(first, second);
}

#[test]
fn scam_alerts_are_bounded_and_keep_input_order() {
    let mut items: Vec<NewsItem> = (0..12)
        .map(|i| {
            item(
                &format!("s{i}"),
                &format!("Scam alert number {i}"),
                "A new fraud wave.",
            )
        })
        .collect();
    items.insert(5, item("clean", "Garden club meets Tuesday", "Bring gloves."));

    let alerts = scam_alerts(&items);

    assert_eq!(alerts.len(), 10);
    assert!(alerts.iter().all(|a| a.id != "clean"));
    // Original relative order, no reordering by recency or score.
    let expected: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
    let got: Vec<String> = alerts.iter().map(|a| a.id.clone()).collect();
    assert_eq!(got, expected);
}

#[test]
fn alert_terms_are_independent_of_the_assigned_bucket() {
    // Matches the alert word list but classifies by its dominant signal.
    let mut it = item("x", "Medicare Part D premium spoof letters circulating", "");
    it.category = Some(Category::Medicare);
    let alerts = scam_alerts(&[it]);
    assert_eq!(alerts.len(), 1);
}

#[test]
fn category_counts_order_by_count_then_label() {
    let mut items = vec![
        item("1", "a", ""),
        item("2", "b", ""),
        item("3", "c", ""),
        item("4", "d", ""),
        item("5", "e", ""),
    ];
    items[0].category = Some(Category::Travel);
    items[1].category = Some(Category::Travel);
    items[2].category = Some(Category::Medicare);
    items[3].category = Some(Category::Medicare);
    items[4].category = Some(Category::General);

    let counts = category_counts(&items);

    assert_eq!(counts.len(), 3);
    // Tie between Medicare and Travel resolves lexically.
    assert_eq!(counts[0].category, Category::Medicare);
    assert_eq!(counts[1].category, Category::Travel);
    assert_eq!(counts[2].category, Category::General);
    assert_eq!(counts[2].count, 1);
}

#[test]
fn fallback_summary_lists_counts_and_headlines() {
    let mut items = vec![
        item("1", "Medicare premium changes announced", ""),
        item("2", "New phishing scam reported", ""),
    ];
    items[0].category = Some(Category::Medicare);
    items[1].category = Some(Category::SafetyScams);

    let summary = summary_fallback(&items);
    let mut lines = summary.lines();

    let first = lines.next().expect("aggregate line present");
    assert!(first.contains("at a glance"));
    assert!(first.contains("Medicare: 1"));
    assert!(first.contains("Safety & Scams: 1"));

    let rest: Vec<&str> = lines.collect();
    assert_eq!(rest.len(), 2);
    assert!(rest[0].starts_with("- Medicare premium changes announced"));
    assert!(rest[0].ends_with("(Test Wire)"));
}
