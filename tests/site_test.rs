use chrono::Utc;
use senior_news_daily::classifier::Category;
use senior_news_daily::site::{build_site, slugify};
use senior_news_daily::types::{CategoryCount, Digest, NewsItem};

fn item(id: &str, title: &str, category: Category) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: "A short excerpt.".to_string(),
        link: format!("https://example.org/{id}"),
        source: "Example Wire".to_string(),
        published: Some(Utc::now()),
        fetched: Utc::now(),
        category: Some(category),
        subcategory: None,
    }
}

fn digest_for(items: &[NewsItem]) -> Digest {
    Digest {
        generated: Utc::now(),
        summary: "Today in brief.".to_string(),
        alerts: items
            .iter()
            .filter(|it| it.category == Some(Category::SafetyScams))
            .cloned()
            .collect(),
        category_counts: vec![CategoryCount {
            category: Category::SafetyScams,
            count: 1,
        }],
    }
}

#[test]
fn slugs_are_lowercase_dashed_and_never_empty() {
    assert_eq!(slugify("Safety & Scams"), "safety-scams");
    assert_eq!(slugify("Cooking & Nutrition"), "cooking-nutrition");
    assert_eq!(slugify("General"), "general");
    assert_eq!(slugify("!!!"), "general");
    assert_eq!(slugify(""), "general");
}

#[tokio::test]
async fn all_pages_are_written_and_escaped() {
    let items = vec![
        item("a1", "New phishing scam hits <b>retirees</b> & \"savers\"", Category::SafetyScams),
        item("a2", "Heart-healthy recipes for two", Category::CookingNutrition),
        item("a3", "Community notes", Category::General),
    ];
    let digest = digest_for(&items);

    let dir = tempfile::tempdir().expect("tempdir");
    build_site(&items, &digest, dir.path()).await.expect("site builds");

    for page in ["index.html", "archive.html", "saved.html", "scam-resources.html", "styles.css"] {
        assert!(dir.path().join(page).exists(), "{page} missing");
    }
    for cat in ["safety-scams", "cooking-nutrition", "general"] {
        assert!(
            dir.path().join("category").join(format!("{cat}.html")).exists(),
            "category page {cat} missing"
        );
    }

    let index = std::fs::read_to_string(dir.path().join("index.html")).expect("index");
    // Markup in titles is escaped, never emitted raw.
    assert!(index.contains("&lt;b&gt;retirees&lt;/b&gt; &amp; &quot;savers&quot;"));
    assert!(!index.contains("<b>retirees</b>"));

    // Summary, chips, and alerts all render.
    assert!(index.contains("Today in brief."));
    assert!(index.contains("data-cat='__all'"));
    assert!(index.contains("data-cat='cooking-nutrition'"));
    assert!(index.contains("Scam Alerts"));

    let category_page =
        std::fs::read_to_string(dir.path().join("category/cooking-nutrition.html")).expect("page");
    assert!(category_page.contains("Heart-healthy recipes for two"));
    assert!(!category_page.contains("Community notes"));

    let resources =
        std::fs::read_to_string(dir.path().join("scam-resources.html")).expect("resources");
    assert!(resources.contains("reportfraud.ftc.gov"));
    assert!(resources.contains("phishing scam"));
}

#[tokio::test]
async fn empty_alert_list_renders_a_placeholder() {
    let items = vec![item("a2", "Heart-healthy recipes for two", Category::CookingNutrition)];
    let digest = Digest {
        generated: Utc::now(),
        summary: String::new(),
        alerts: Vec::new(),
        category_counts: Vec::new(),
    };

    let dir = tempfile::tempdir().expect("tempdir");
    build_site(&items, &digest, dir.path()).await.expect("site builds");

    let index = std::fs::read_to_string(dir.path().join("index.html")).expect("index");
    assert!(index.contains("No current scam alerts."));
}
