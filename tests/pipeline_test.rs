use chrono::{Duration, TimeZone, Utc};
use senior_news_daily::classifier::Category;
use senior_news_daily::pipeline::{dedupe_and_sort, discover_feed_url, extract_page_item, item_from_entry};
use senior_news_daily::sources::build_sources_report;
use senior_news_daily::store::DataStore;
use senior_news_daily::types::{ItemsDocument, NewsItem, ParsedEntry};
use senior_news_daily::FilterMode;

fn entry(title: &str, summary: &str, link: Option<&str>) -> ParsedEntry {
    ParsedEntry {
        title: title.to_string(),
        summary: Some(summary.to_string()),
        link: link.map(str::to_string),
        published: None,
    }
}

fn stored_item(id: &str, link: &str, source: &str, days_ago: i64) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: format!("title {id}"),
        summary: String::new(),
        link: link.to_string(),
        source: source.to_string(),
        published: Some(Utc::now() - Duration::days(days_ago)),
        fetched: Utc::now(),
        category: None,
        subcategory: None,
    }
}

#[test]
fn entries_get_stable_ids_and_stripped_summaries() {
    let now = Utc::now();
    let first = item_from_entry(
        entry(
            "Medicare premiums set to rise",
            "<p>The <b>premium</b> for Part B\n  will change.</p>",
            Some("https://example.org/premiums"),
        ),
        "Example Wire",
        now,
        FilterMode::Loose,
    )
    .expect("relevant English entry passes");

    assert_eq!(first.summary, "The premium for Part B will change.");
    assert_eq!(first.id.len(), 16);
    assert!(first.id.chars().all(|c| c.is_ascii_hexdigit()));

    // Same link, same id on a later run.
    let second = item_from_entry(
        entry(
            "Medicare premiums set to rise (updated)",
            "fresh text",
            Some("https://example.org/premiums"),
        ),
        "Example Wire",
        now,
        FilterMode::None,
    )
    .expect("entry passes");
    assert_eq!(first.id, second.id);
}

#[test]
fn topic_filter_modes_gate_entries() {
    let now = Utc::now();
    let golf = entry(
        "Best golf courses to visit this fall",
        "A relaxed weekend guide.",
        Some("https://example.org/golf"),
    );

    assert!(item_from_entry(golf, "Example Wire", now, FilterMode::Strict).is_none());

    let golf_again = entry(
        "Best golf courses to visit this fall",
        "A relaxed weekend guide.",
        Some("https://example.org/golf"),
    );
    assert!(item_from_entry(golf_again, "Example Wire", now, FilterMode::Loose).is_some());

    let offtopic = entry(
        "Quarterly earnings call transcript posted",
        "Full remarks from the executive team.",
        Some("https://example.org/earnings"),
    );
    assert!(item_from_entry(offtopic, "Example Wire", now, FilterMode::None).is_some());
}

#[test]
fn confidently_non_english_entries_are_dropped() {
    let now = Utc::now();
    let spanish = entry(
        "El gobierno anuncia nuevos beneficios para los jubilados",
        "El gobierno anunció este martes nuevos beneficios del seguro social para los jubilados \
         y pensionados en todo el país. La medida fue confirmada durante una conferencia de \
         prensa celebrada en la capital, donde las autoridades explicaron los detalles del plan.",
        Some("https://example.org/es"),
    );
    assert!(item_from_entry(spanish, "Example Wire", now, FilterMode::None).is_none());

    let english = entry(
        "Agency announces new benefits for retirees",
        "Officials confirmed the change at a press conference on Tuesday, describing the plan \
         in detail and taking questions from reporters for nearly an hour afterward.",
        Some("https://example.org/en"),
    );
    assert!(item_from_entry(english, "Example Wire", now, FilterMode::None).is_some());
}

#[test]
fn dedupe_keeps_first_occurrence_and_sorts_newest_first() {
    let old = stored_item("a", "https://example.org/one", "Wire", 3);
    let newer = stored_item("b", "https://example.org/two", "Wire", 1);
    let duplicate = stored_item("c", "https://example.org/one", "Other Wire", 0);

    let result = dedupe_and_sort(vec![old.clone(), newer.clone(), duplicate]);

    assert_eq!(result.len(), 2);
    // Duplicate link: the first occurrence wins even if the copy is newer.
    assert_eq!(result.iter().filter(|it| it.link == "https://example.org/one").count(), 1);
    assert_eq!(result[0].id, "b");
    assert_eq!(result[1].id, "a");
}

#[test]
fn feed_autodiscovery_resolves_relative_hrefs() {
    let html = r#"<html><head>
        <link rel="stylesheet" href="styles.css">
        <link rel="alternate" type="application/rss+xml" href="/feeds/news.xml">
    </head><body></body></html>"#;

    assert_eq!(
        discover_feed_url(html, "https://example.org/some/page"),
        Some("https://example.org/feeds/news.xml".to_string())
    );
    assert_eq!(discover_feed_url("<html><head></head></html>", "https://example.org/"), None);
}

#[test]
fn page_extraction_builds_a_custom_url_item() {
    let html = r#"<html><head>
        <title>Medicare enrollment deadline nears</title>
        <meta name="description" content="Seniors have two weeks left to pick a plan.">
    </head><body><p>Body text.</p></body></html>"#;

    let item = extract_page_item(html, "https://example.org/story", Utc::now(), FilterMode::Loose)
        .expect("on-topic page extracts");

    assert_eq!(item.title, "Medicare enrollment deadline nears");
    assert_eq!(item.summary, "Seniors have two weeks left to pick a plan.");
    assert_eq!(item.source, "Custom URL");
    assert_eq!(item.link, "https://example.org/story");
}

#[tokio::test]
async fn items_document_roundtrips_through_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DataStore::new(dir.path());

    // Missing file reads as empty.
    let empty = store.load_items().await.expect("load");
    assert!(empty.items.is_empty());

    let mut item = stored_item("a1", "https://example.org/one", "Wire", 0);
    item.category = Some(Category::SafetyScams);
    item.subcategory = Some("Fraud Watch".to_string());

    let doc = ItemsDocument {
        updated: Some(Utc.with_ymd_and_hms(2026, 8, 4, 12, 0, 0).unwrap()),
        items: vec![item],
    };
    store.save_items(&doc).await.expect("save");

    let raw = std::fs::read_to_string(store.items_path()).expect("file exists");
    assert!(raw.contains("Safety & Scams"), "category serializes as its label");

    let loaded = store.load_items().await.expect("reload");
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].category, Some(Category::SafetyScams));
    assert_eq!(loaded.updated, doc.updated);
}

#[test]
fn sources_report_groups_counts_and_windows() {
    let now = Utc::now();
    let items = vec![
        stored_item("a", "https://www.kff.org/one", "KFF Health News", 1),
        stored_item("b", "https://kff.org/two", "KFF Health News", 2),
        stored_item("c", "https://example.org/three", "Example Wire", 0),
        // Outside the 7-day window.
        stored_item("d", "https://example.org/old", "Example Wire", 30),
        // No source name: falls back to the link domain.
        stored_item("e", "https://ssa.gov/press", "", 1),
    ];

    let report = build_sources_report(&items, now, 7);

    assert_eq!(report.window_days, 7);
    assert_eq!(report.sources.len(), 3);
    assert_eq!(report.sources[0].key, "kff health news");
    assert_eq!(report.sources[0].count, 2);
    assert_eq!(report.sources[0].last_title, "title a");

    let ssa = report
        .sources
        .iter()
        .find(|s| s.key == "ssa.gov")
        .expect("domain-keyed source present");
    assert_eq!(ssa.domain, "ssa.gov");

    let example = report
        .sources
        .iter()
        .find(|s| s.key == "example wire")
        .expect("source present");
    assert_eq!(example.count, 1, "stale article is outside the window");
}
