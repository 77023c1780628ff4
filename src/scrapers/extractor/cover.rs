//! Cover image candidates on an entry page.

use std::sync::LazyLock;

use scraper::Selector;

use super::page::Page;
use crate::scrapers::config::SiteConfig;

/// Image locations in order of preference.
static COVER_IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"img[itemprop="image"]"#,
        "img.noveldefaultimage",
        r#"td[width="200"] img"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Absolute URLs of every cover candidate, deduplicated, in page order.
pub fn cover_candidates(page: &Page) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for selector in COVER_IMAGES.iter() {
        for img in page.document().select(selector) {
            let Some(src) = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
            else {
                continue;
            };
            if let Some(url) = page.resolve(src) {
                if !found.contains(&url) {
                    found.push(url);
                }
            }
        }
    }
    found
}

/// Pick a cover, preferring first-party hosts.
pub fn choose_cover(page: &Page, site: &SiteConfig) -> Option<String> {
    let candidates = cover_candidates(page);
    candidates
        .iter()
        .find(|url| site.is_first_party(url))
        .or_else(|| candidates.first())
        .cloned()
}
