//! Static site rendering.
//!
//! Turns the items and digest documents into a handful of flat HTML pages
//! plus a stylesheet. All dynamic behavior (category filter, save-for-later)
//! is client-side and persisted in localStorage, so the output is fully
//! static and cacheable.

use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::classifier::Category;
use crate::digest::category_counts;
use crate::types::{Digest, NewsItem, Result};
use crate::utils::text::truncate_chars;

/// HTML-escape text and attribute content.
fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn fmt_date(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => String::new(),
    }
}

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// Lowercase, dash-separated form used for CSS classes, data attributes,
/// and category page filenames.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let slug = NON_SLUG.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "general".to_string()
    } else {
        slug.to_string()
    }
}

fn item_category(item: &NewsItem) -> Category {
    item.category.unwrap_or(Category::General)
}

fn render_chips(items: &[NewsItem]) -> String {
    let counts = category_counts(items);
    let mut chips = vec![format!(
        "<button class='chip active' data-cat='__all'>All <b>{}</b></button>",
        items.len()
    )];
    for cc in counts {
        chips.push(format!(
            "<button class='chip' data-cat='{}'>{} <b>{}</b></button>",
            esc(&slugify(cc.category.label())),
            esc(cc.category.label()),
            cc.count
        ));
    }
    chips.join("\n")
}

fn render_card(item: &NewsItem) -> String {
    let category = item_category(item);
    let slug = slugify(category.label());
    format!(
        "<div class='card cat-{slug}' data-id='{id}' data-cat='{slug}'>\
         <a class='card-block' href='{link}' target='_blank' rel='noopener'>\
         <div class='card-title'>{title}</div>\
         <div class='card-meta'>{source} · {date} · <span class='badge cat-{slug}'>{label}</span></div>\
         <div class='card-summary'>{summary}</div>\
         </a>\
         <button class='save' data-id='{id}' title='Save for later' aria-label='Save'>&#9734;</button>\
         </div>",
        slug = esc(&slug),
        id = esc(&item.id),
        link = esc(&item.link),
        title = esc(&item.title),
        source = esc(&item.source),
        date = esc(&fmt_date(Some(item.best_timestamp()))),
        label = esc(category.label()),
        summary = esc(&truncate_chars(&item.summary, 250)),
    )
}

fn render_cards(items: &[NewsItem]) -> String {
    items.iter().map(render_card).collect::<Vec<_>>().join("\n")
}

fn render_alerts(alerts: &[NewsItem]) -> String {
    if alerts.is_empty() {
        return "<p>No current scam alerts.</p>".to_string();
    }
    let mut out = vec!["<ul class='alerts'>".to_string()];
    for alert in alerts {
        out.push(format!(
            "<li><a href='{}' target='_blank' rel='noopener'>{}</a> <small>{}</small></li>",
            esc(&alert.link),
            esc(&alert.title),
            esc(&fmt_date(Some(alert.best_timestamp())))
        ));
    }
    out.push("</ul>".to_string());
    out.join("\n")
}

/// Day buckets, newest first, preserving item order within a day.
fn group_by_day(items: &[NewsItem]) -> Vec<(String, Vec<&NewsItem>)> {
    let mut days: Vec<(String, Vec<&NewsItem>)> = Vec::new();
    for item in items {
        let day = item.best_timestamp().format("%Y-%m-%d").to_string();
        match days.iter().position(|(d, _)| *d == day) {
            Some(pos) => days[pos].1.push(item),
            None => days.push((day, vec![item])),
        }
    }
    days.sort_by(|a, b| b.0.cmp(&a.0));
    days
}

fn render_archive_links(items: &[NewsItem]) -> String {
    let days = group_by_day(items);
    let mut out = vec!["<ul class='archives'>".to_string()];
    for (day, bucket) in days {
        out.push(format!(
            "<li><a href='archive.html'>{}</a> <span class='muted'>({} articles)</span></li>",
            esc(&day),
            bucket.len()
        ));
    }
    out.push("</ul>".to_string());
    out.join("\n")
}

fn render_category_links(items: &[NewsItem]) -> String {
    let counts = category_counts(items);
    let mut out = vec!["<ul class='catlinks'>".to_string()];
    for cc in counts {
        let slug = slugify(cc.category.label());
        out.push(format!(
            "<li><a href='category/{slug}.html'>{}</a> <span class='muted'>({})</span></li>",
            esc(cc.category.label()),
            cc.count,
            slug = esc(&slug),
        ));
    }
    out.push("</ul>".to_string());
    out.join("\n")
}

/// Shared page frame: head, hero, nav, footer. `depth` rewrites relative
/// links for pages living in a subdirectory.
fn page_shell(title: &str, body: &str, script: &str, depth: usize) -> String {
    let prefix = "../".repeat(depth);
    let nav = format!(
        "<nav class='topnav'>\
         <a href='{p}index.html'>Home</a>\
         <a href='{p}archive.html'>Archive</a>\
         <a href='{p}saved.html'>Saved</a>\
         <a href='{p}scam-resources.html'>Scam Resources</a>\
         </nav>",
        p = prefix
    );
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{prefix}styles.css\" />\n\
         </head>\n<body>\n\
         <header class=\"hero\">\n\
         <h1>Plan boldly. Retire confidently.</h1>\n\
         <p class=\"subtitle\">AI-powered daily insights for seniors — health, finance, leisure &amp; scams.</p>\n\
         {nav}\n\
         </header>\n\
         <main class=\"container\">\n{body}\n</main>\n\
         <footer class=\"footer\">\n\
         <p class=\"muted\">© {year} Senior News Daily — All Rights Reserved</p>\n\
         </footer>\n\
         {script}\n\
         </body>\n</html>\n",
        title = esc(title),
        prefix = prefix,
        nav = nav,
        body = body,
        script = script,
        year = Utc::now().year(),
    )
}

fn index_page(items: &[NewsItem], digest: &Digest) -> String {
    let body = format!(
        "<section class='summary'>\n<h2>Daily Summary</h2>\n<p>{summary}</p>\n\
         <p class='muted'>Last updated: {updated}</p>\n</section>\n\
         <section class='filters'>\n<h2>Filter by Category</h2>\n<div class='filterbar'>\n{chips}\n</div>\n</section>\n\
         <section class='articles'>\n<h2>Latest Articles</h2>\n<div id='cards'>\n{cards}\n</div>\n</section>\n\
         <section class='scam-alerts'>\n<h2>⚠️ Scam Alerts</h2>\n{alerts}\n</section>\n\
         <section class='categories'>\n<h2>Browse by Category</h2>\n{catlinks}\n</section>\n\
         <section class='archives'>\n<h2>Archives</h2>\n{archives}\n</section>",
        summary = esc(&digest.summary),
        updated = esc(&fmt_date(Some(digest.generated))),
        chips = render_chips(items),
        cards = render_cards(items),
        alerts = render_alerts(&digest.alerts),
        catlinks = render_category_links(items),
        archives = render_archive_links(items),
    );
    page_shell("Senior News Daily", &body, INDEX_SCRIPT, 0)
}

fn archive_page(items: &[NewsItem]) -> String {
    let mut body = String::from("<section class='articles'>\n<h2>Archive</h2>\n");
    for (day, bucket) in group_by_day(items) {
        body.push_str(&format!(
            "<h3>{} <span class='muted'>({} articles)</span></h3>\n<div class='cards'>\n",
            esc(&day),
            bucket.len()
        ));
        for item in bucket {
            body.push_str(&render_card(item));
            body.push('\n');
        }
        body.push_str("</div>\n");
    }
    body.push_str("</section>");
    page_shell("Archive — Senior News Daily", &body, STARS_SCRIPT, 0)
}

fn saved_page(items: &[NewsItem]) -> String {
    let body = format!(
        "<section class='articles'>\n<h2>Saved Articles</h2>\n\
         <p class='muted'>Articles you starred are kept in this browser only.</p>\n\
         <p id='empty-note' class='muted' style='display:none'>Nothing saved yet. Tap the ☆ on any article.</p>\n\
         <div id='cards'>\n{}\n</div>\n</section>",
        render_cards(items)
    );
    page_shell("Saved — Senior News Daily", &body, SAVED_SCRIPT, 0)
}

fn category_page(category: Category, items: &[NewsItem]) -> String {
    let in_bucket: Vec<NewsItem> = items
        .iter()
        .filter(|it| item_category(it) == category)
        .cloned()
        .collect();
    let body = format!(
        "<section class='articles'>\n<h2>{label}</h2>\n\
         <p class='muted'>{count} article(s) in this category.</p>\n\
         <div class='cards'>\n{cards}\n</div>\n</section>",
        label = esc(category.label()),
        count = in_bucket.len(),
        cards = render_cards(&in_bucket),
    );
    page_shell(
        &format!("{} — Senior News Daily", category.label()),
        &body,
        STARS_SCRIPT,
        1,
    )
}

fn scam_resources_page(digest: &Digest) -> String {
    let body = format!(
        "<section class='scam-alerts'>\n<h2>⚠️ Current Scam Alerts</h2>\n{alerts}\n</section>\n\
         <section class='resources'>\n<h2>Report and Learn More</h2>\n<ul class='resources'>\n\
         <li><a href='https://reportfraud.ftc.gov/' target='_blank' rel='noopener'>FTC — report fraud</a></li>\n\
         <li><a href='https://oig.ssa.gov/report/' target='_blank' rel='noopener'>Social Security OIG — report Social Security scams</a></li>\n\
         <li><a href='https://www.justice.gov/elderjustice' target='_blank' rel='noopener'>DOJ Elder Justice Initiative</a></li>\n\
         <li><a href='https://www.ic3.gov/' target='_blank' rel='noopener'>FBI Internet Crime Complaint Center (IC3)</a></li>\n\
         <li><a href='https://www.aarp.org/money/scams-fraud/' target='_blank' rel='noopener'>AARP Fraud Watch Network</a></li>\n\
         </ul>\n</section>",
        alerts = render_alerts(&digest.alerts),
    );
    page_shell("Scam Resources — Senior News Daily", &body, "", 0)
}

/// Render every page into `site_dir`.
pub async fn build_site(items: &[NewsItem], digest: &Digest, site_dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(site_dir.join("category")).await?;

    tokio::fs::write(site_dir.join("index.html"), index_page(items, digest)).await?;
    tokio::fs::write(site_dir.join("archive.html"), archive_page(items)).await?;
    tokio::fs::write(site_dir.join("saved.html"), saved_page(items)).await?;
    tokio::fs::write(site_dir.join("scam-resources.html"), scam_resources_page(digest)).await?;
    tokio::fs::write(site_dir.join("styles.css"), STYLES).await?;

    let mut category_pages = 0;
    for cc in category_counts(items) {
        let slug = slugify(cc.category.label());
        let path = site_dir.join("category").join(format!("{slug}.html"));
        tokio::fs::write(path, category_page(cc.category, items)).await?;
        category_pages += 1;
    }

    info!(
        articles = items.len(),
        category_pages,
        dir = %site_dir.display(),
        "site built"
    );
    Ok(())
}

/// Category filter persistence plus save-for-later stars (home page).
const INDEX_SCRIPT: &str = r##"<script>
  // Persisted category filter
  const FILTER_KEY = "snd_active_cat"; // stores slug or "__all"
  function getActiveCat(){ try { return localStorage.getItem(FILTER_KEY) || "__all"; } catch(e) { return "__all"; } }
  function setActiveCat(slug){ try { localStorage.setItem(FILTER_KEY, slug); } catch(e) {} }

  const cards = Array.from(document.querySelectorAll('#cards .card'));
  const chips = Array.from(document.querySelectorAll('.chip'));
  function applyFilter(slug) {
    cards.forEach(c => {
      const ok = (slug === "__all") || (c.getAttribute('data-cat') === slug);
      c.style.display = ok ? "" : "none";
    });
    chips.forEach(ch => ch.classList.toggle('active', ch.getAttribute('data-cat') === slug));
  }
  chips.forEach(ch => {
    ch.addEventListener('click', () => {
      const slug = ch.getAttribute('data-cat');
      setActiveCat(slug);
      applyFilter(slug);
    });
  });

  // Save-for-later (star/unstar) de-duped by id
  const SAVE_KEY = "snd_saved_ids";
  function getSaved(){ try { return JSON.parse(localStorage.getItem(SAVE_KEY) || "[]"); } catch(e) { return []; } }
  function setSaved(a){ localStorage.setItem(SAVE_KEY, JSON.stringify(Array.from(new Set(a)))); }
  function updateStars(){
    const cur = new Set(getSaved());
    document.querySelectorAll('.card .save').forEach(btn => {
      const id = btn.getAttribute('data-id');
      btn.innerHTML = cur.has(id) ? "★" : "☆";
    });
  }
  document.addEventListener('click', (e) => {
    const t = e.target;
    if (t && t.classList.contains('save')) {
      e.preventDefault();
      const id = t.getAttribute('data-id');
      const cur = new Set(getSaved());
      cur.has(id) ? cur.delete(id) : cur.add(id);
      setSaved(Array.from(cur));
      updateStars();
    }
  });

  const initial = getActiveCat();
  chips.forEach(ch => ch.classList.toggle('active', ch.getAttribute('data-cat') === initial));
  applyFilter(initial);
  updateStars();
</script>"##;

/// Stars only (archive and category pages).
const STARS_SCRIPT: &str = r##"<script>
  const SAVE_KEY = "snd_saved_ids";
  function getSaved(){ try { return JSON.parse(localStorage.getItem(SAVE_KEY) || "[]"); } catch(e) { return []; } }
  function setSaved(a){ localStorage.setItem(SAVE_KEY, JSON.stringify(Array.from(new Set(a)))); }
  function updateStars(){
    const cur = new Set(getSaved());
    document.querySelectorAll('.card .save').forEach(btn => {
      const id = btn.getAttribute('data-id');
      btn.innerHTML = cur.has(id) ? "★" : "☆";
    });
  }
  document.addEventListener('click', (e) => {
    const t = e.target;
    if (t && t.classList.contains('save')) {
      e.preventDefault();
      const id = t.getAttribute('data-id');
      const cur = new Set(getSaved());
      cur.has(id) ? cur.delete(id) : cur.add(id);
      setSaved(Array.from(cur));
      updateStars();
    }
  });
  updateStars();
</script>"##;

/// Saved page: show only locally saved cards.
const SAVED_SCRIPT: &str = r##"<script>
  const SAVE_KEY = "snd_saved_ids";
  function getSaved(){ try { return JSON.parse(localStorage.getItem(SAVE_KEY) || "[]"); } catch(e) { return []; } }
  function setSaved(a){ localStorage.setItem(SAVE_KEY, JSON.stringify(Array.from(new Set(a)))); }
  function refresh(){
    const cur = new Set(getSaved());
    let visible = 0;
    document.querySelectorAll('#cards .card').forEach(c => {
      const keep = cur.has(c.getAttribute('data-id'));
      c.style.display = keep ? "" : "none";
      if (keep) visible++;
    });
    document.querySelectorAll('.card .save').forEach(btn => {
      btn.innerHTML = cur.has(btn.getAttribute('data-id')) ? "★" : "☆";
    });
    const note = document.getElementById('empty-note');
    if (note) note.style.display = visible === 0 ? "" : "none";
  }
  document.addEventListener('click', (e) => {
    const t = e.target;
    if (t && t.classList.contains('save')) {
      e.preventDefault();
      const id = t.getAttribute('data-id');
      const cur = new Set(getSaved());
      cur.has(id) ? cur.delete(id) : cur.add(id);
      setSaved(Array.from(cur));
      refresh();
    }
  });
  refresh();
</script>"##;

const STYLES: &str = r##"* { box-sizing: border-box; }
body { margin: 0; font-family: Georgia, 'Times New Roman', serif; font-size: 17px; color: #1f2937; background: #fafaf7; }
.hero { background: #134e4a; color: #fff; padding: 28px 16px; text-align: center; }
.hero h1 { margin: 0 0 6px; font-size: 30px; }
.hero .subtitle { margin: 0 0 12px; color: #d1fae5; }
.topnav a { color: #fff; margin: 0 10px; text-decoration: none; font-weight: 700; }
.topnav a:hover { text-decoration: underline; }
.container { max-width: 960px; margin: 0 auto; padding: 16px; }
section { margin-bottom: 28px; }
.summary p { line-height: 1.5; white-space: pre-line; }
.filterbar { display: flex; flex-wrap: wrap; gap: 8px; padding: 12px 0; }
.chip { display: inline-block; padding: 8px 12px; border-radius: 999px; background: #f3f4f6;
        cursor: pointer; border: 1px solid #e5e7eb; font: inherit; font-weight: 700; }
.chip.active { background: #111; color: #fff; }
#cards, .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 14px; }
.card { position: relative; background: #fff; border: 1px solid #e5e7eb; border-left: 5px solid #9ca3af;
        border-radius: 10px; padding: 4px; }
.card-block { display: block; padding: 12px; color: inherit; text-decoration: none; }
.card-title { font-weight: 700; line-height: 1.3; }
.card-meta { margin-top: 6px; color: #6b7280; font-size: 13px; }
.card-summary { margin-top: 8px; color: #374151; font-size: 14px; }
.badge { padding: 1px 8px; border-radius: 999px; background: #e5e7eb; font-size: 12px; }
.save { position: absolute; top: 8px; right: 8px; border: none; background: none;
        font-size: 20px; cursor: pointer; color: #b45309; }
.card.cat-safety-scams { border-left-color: #dc2626; }
.card.cat-social-security { border-left-color: #2563eb; }
.card.cat-medicare { border-left-color: #0891b2; }
.card.cat-finance-retirement { border-left-color: #059669; }
.card.cat-travel { border-left-color: #d97706; }
.card.cat-golf-leisure { border-left-color: #65a30d; }
.card.cat-cooking-nutrition { border-left-color: #ea580c; }
.card.cat-caregiving-ltc { border-left-color: #7c3aed; }
.card.cat-aging-research { border-left-color: #0d9488; }
.card.cat-policy-legislation { border-left-color: #4b5563; }
.alerts li, .archives li, .catlinks li, .resources li { margin: 6px 0; }
.muted { color: #6b7280; }
.footer { border-top: 1px solid #e5e7eb; margin-top: 24px; padding: 16px; text-align: center; }
"##;
