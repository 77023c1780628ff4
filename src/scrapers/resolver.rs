//! Title resolver.
//!
//! Maps a free-text title to a canonical entry. The structured JSON search
//! endpoint is tried first; the rendered results page is only consulted when
//! that yields nothing or fails. The fallback is a different strategy, not a
//! retry: neither channel is retried on failure.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::config::SiteConfig;
use super::error::{CrawlerError, FetchError};
use super::http_client::{Fetch, FetchRequest};
use crate::models::SearchResult;

static ENTRY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"onebook\.php\?novelid=(\d+)").unwrap());
static AUTHOR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"oneauthor\.php\?authorid=\d+").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Resolves titles against the upstream site's search.
pub struct Resolver {
    fetcher: Arc<dyn Fetch>,
    site: SiteConfig,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn Fetch>, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    /// Resolve `title` to its first search hit.
    ///
    /// Returns `CrawlerError::NotFound` only when both channels answered and
    /// neither had a match. A failing results page yields
    /// `CrawlerError::Search` carrying both causes.
    pub async fn resolve(&self, title: &str) -> Result<SearchResult, CrawlerError> {
        let structured = match self.search_structured(title).await {
            Ok(Some(hit)) => {
                debug!("Structured search resolved '{}' to {}", title, hit.id);
                return Ok(hit);
            }
            Ok(None) => "no result".to_string(),
            Err(e) => {
                warn!("Structured search for '{}' failed: {}", title, e);
                e.to_string()
            }
        };

        info!(
            "Falling back to results page for '{}' ({})",
            title, structured
        );
        match self.search_page(title).await {
            Ok(Some(hit)) => Ok(hit),
            Ok(None) => Err(CrawlerError::NotFound(title.to_string())),
            Err(fallback) => Err(CrawlerError::Search {
                structured,
                fallback,
            }),
        }
    }

    async fn search_structured(&self, title: &str) -> Result<Option<SearchResult>, FetchError> {
        let url = self.site.search_api_url(title);
        let referer = self.site.search_referer();
        let page = self
            .fetcher
            .fetch(FetchRequest::ajax(&url).with_referer(&referer))
            .await?;
        Ok(parse_search_json(&page.text(), &self.site))
    }

    async fn search_page(&self, title: &str) -> Result<Option<SearchResult>, FetchError> {
        let url = self.site.search_page_url(title);
        let referer = self.site.search_referer();
        let page = self
            .fetcher
            .fetch(FetchRequest::page(&url).with_referer(&referer))
            .await?;
        Ok(parse_search_page(&page.text(), &self.site))
    }
}

/// Read an integer that the endpoint may send as a number or a string.
fn loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Take the first hit of a JSON search response.
///
/// Any shape mismatch, a non-200 application status or an empty list all
/// mean "no structured result".
pub fn parse_search_json(body: &str, site: &SiteConfig) -> Option<SearchResult> {
    let data: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            debug!("Search response is not JSON: {}", e);
            return None;
        }
    };

    let status = data.get("status").and_then(loose_int);
    if status != Some(200) {
        debug!("Search response status {:?}", status);
        return None;
    }

    let first = data.get("data")?.as_array()?.first()?;
    let id = first.get("novelid").and_then(loose_int)?;
    let title = first.get("novelname").and_then(loose_string)?;
    let author = first.get("authorname").and_then(loose_string);

    Some(SearchResult {
        id,
        title,
        author,
        url: site.entry_url(id),
    })
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Find the first entry link on a rendered results page.
pub fn parse_search_page(html: &str, site: &SiteConfig) -> Option<SearchResult> {
    let document = Html::parse_document(html);

    let anchors: Vec<ElementRef<'_>> = document.select(&ANCHOR).collect();
    for (index, anchor) in anchors.iter().enumerate() {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(id) = ENTRY_LINK
            .captures(href)
            .and_then(|caps| caps[1].parse::<i64>().ok())
        else {
            continue;
        };
        let title = element_text(anchor);
        if title.is_empty() {
            continue;
        }

        let author = author_after(anchor, &anchors[index + 1..]);
        return Some(SearchResult {
            id,
            title,
            author,
            url: site.entry_url(id),
        });
    }

    None
}

/// Author link belonging to the same result as `entry`: a sibling of the
/// entry link, or the next author link before another entry link.
fn author_after(entry: &ElementRef<'_>, following: &[ElementRef<'_>]) -> Option<String> {
    let is_author = |el: &ElementRef<'_>| {
        el.value()
            .attr("href")
            .is_some_and(|href| AUTHOR_LINK.is_match(href))
    };

    let sibling = entry
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a" && is_author(el));
    if let Some(el) = sibling {
        let text = element_text(&el);
        if !text.is_empty() {
            return Some(text);
        }
    }

    for el in following {
        let href = el.value().attr("href").unwrap_or("");
        if ENTRY_LINK.is_match(href) {
            break;
        }
        if AUTHOR_LINK.is_match(href) {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::stub::StubFetcher;

    const RESULTS_PAGE: &str = r#"<html><body>
        <div class="result">
          <h3><a href="/onebook.php?novelid=912073" target="_blank">天涯客</a></h3>
          <span>作者：<a href="/oneauthor.php?authorid=189632">priest</a></span>
        </div>
        <div class="result">
          <h3><a href="/onebook.php?novelid=1673146">镇魂</a></h3>
        </div>
        </body></html>"#;

    #[test]
    fn test_parse_search_json_first_hit() {
        let site = SiteConfig::default();
        let body = r#"{"status":200,"data":[
            {"novelid":"912073","novelname":"天涯客","authorname":"priest"},
            {"novelid":"1","novelname":"other","authorname":"x"}]}"#;
        let hit = parse_search_json(body, &site).unwrap();
        assert_eq!(hit.id, 912073);
        assert_eq!(hit.title, "天涯客");
        assert_eq!(hit.author.as_deref(), Some("priest"));
        assert_eq!(hit.url, site.entry_url(912073));
    }

    #[test]
    fn test_parse_search_json_rejects_bad_shapes() {
        let site = SiteConfig::default();
        assert!(parse_search_json(r#"{"status":500,"data":[{"novelid":1,"novelname":"a"}]}"#, &site).is_none());
        assert!(parse_search_json(r#"{"status":200,"data":[]}"#, &site).is_none());
        assert!(parse_search_json(r#"{"status":200,"data":{}}"#, &site).is_none());
        assert!(parse_search_json(r#"{"status":200,"data":[{"novelname":"a"}]}"#, &site).is_none());
        assert!(parse_search_json("<html>blocked</html>", &site).is_none());
    }

    #[test]
    fn test_parse_search_json_numeric_fields() {
        let site = SiteConfig::default();
        let body = r#"{"status":"200","data":[{"novelid":42,"novelname":"镇魂"}]}"#;
        let hit = parse_search_json(body, &site).unwrap();
        assert_eq!(hit.id, 42);
        assert_eq!(hit.author, None);
    }

    #[test]
    fn test_parse_search_page_with_author() {
        let site = SiteConfig::default();
        let hit = parse_search_page(RESULTS_PAGE, &site).unwrap();
        assert_eq!(hit.id, 912073);
        assert_eq!(hit.title, "天涯客");
        assert_eq!(hit.author.as_deref(), Some("priest"));
        assert_eq!(hit.url, site.entry_url(912073));
    }

    #[test]
    fn test_parse_search_page_without_author() {
        let site = SiteConfig::default();
        let html = r#"<a href="/onebook.php?novelid=1673146">镇魂</a>
            <a href="/onebook.php?novelid=2">next</a>
            <a href="/oneauthor.php?authorid=1">belongs to next</a>"#;
        let hit = parse_search_page(html, &site).unwrap();
        assert_eq!(hit.id, 1673146);
        assert_eq!(hit.author, None);
    }

    #[test]
    fn test_parse_search_page_no_match() {
        let site = SiteConfig::default();
        assert!(parse_search_page("<p>没有找到</p>", &site).is_none());
    }

    #[tokio::test]
    async fn test_resolve_structured_hit_skips_fallback() {
        let fetcher = StubFetcher::new(vec![(
            "search_ajax.php",
            Ok(r#"{"status":200,"data":[{"novelid":"7","novelname":"镇魂","authorname":"priest"}]}"#.to_string()),
        )]);
        let resolver = Resolver::new(fetcher.clone(), SiteConfig::default());
        let hit = resolver.resolve("镇魂").await.unwrap();
        assert_eq!(hit.id, 7);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_status() {
        let fetcher = StubFetcher::new(vec![
            ("search_ajax.php", Ok(r#"{"status":404,"data":[]}"#.to_string())),
            ("search.php?kw=", Ok(RESULTS_PAGE.to_string())),
        ]);
        let resolver = Resolver::new(fetcher.clone(), SiteConfig::default());
        let hit = resolver.resolve("天涯客").await.unwrap();
        assert_eq!(hit.id, 912073);
        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].contains("search.php?kw=%CC%EC%D1%C4%BF%CD"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_empty_list() {
        let fetcher = StubFetcher::new(vec![
            ("search_ajax.php", Ok(r#"{"status":200,"data":[]}"#.to_string())),
            ("search.php?kw=", Ok(RESULTS_PAGE.to_string())),
        ]);
        let resolver = Resolver::new(fetcher.clone(), SiteConfig::default());
        assert!(resolver.resolve("天涯客").await.is_ok());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_transport_error() {
        let fetcher = StubFetcher::new(vec![
            ("search_ajax.php", Err(502)),
            ("search.php?kw=", Ok(RESULTS_PAGE.to_string())),
        ]);
        let resolver = Resolver::new(fetcher, SiteConfig::default());
        assert_eq!(resolver.resolve("天涯客").await.unwrap().id, 912073);
    }

    #[tokio::test]
    async fn test_resolve_not_found_after_both_channels() {
        let fetcher = StubFetcher::new(vec![
            ("search_ajax.php", Ok(r#"{"status":200,"data":[]}"#.to_string())),
            ("search.php?kw=", Ok("<html><body>没有结果</body></html>".to_string())),
        ]);
        let resolver = Resolver::new(fetcher.clone(), SiteConfig::default());
        let err = resolver.resolve("不存在").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_reports_both_causes() {
        let fetcher = StubFetcher::new(vec![
            ("search_ajax.php", Err(503)),
            ("search.php?kw=", Err(500)),
        ]);
        let resolver = Resolver::new(fetcher, SiteConfig::default());
        let err = resolver.resolve("天涯客").await.unwrap_err();
        assert!(!err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("503"), "{message}");
        assert!(message.contains("500"), "{message}");
    }
}
