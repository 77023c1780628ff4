//! Entry page extraction.
//!
//! An entry page is fetched once and every field is pulled out by its own
//! heuristic, so a missing marker for one field never affects another.
//! Parsing is synchronous: the DOM is built and dropped between awaits.

mod cover;
mod fields;
mod page;
mod strategies;

pub use cover::{choose_cover, cover_candidates};
pub use page::Page;
pub use strategies::{first_match, title_and_author, NameHint, Strategy};

use std::sync::Arc;

use tracing::debug;

use super::config::SiteConfig;
use super::error::CrawlerError;
use super::http_client::{Fetch, FetchRequest};
use crate::models::EntryDetails;

/// Parse a fetched entry page into details.
pub fn parse_entry_page(html: &str, page_url: &str, site: &SiteConfig) -> EntryDetails {
    let page = Page::parse(html, page_url);
    let names = title_and_author(&page);
    let characters = fields::character_notes(&page);
    let info = fields::info_list(&page);

    EntryDetails {
        title: names.title,
        author: names.author,
        synopsis: fields::synopsis(&page),
        tags: fields::tags(&page),
        main_characters: characters.main,
        supporting_characters: characters.supporting,
        other_notes: characters.other,
        category: info.category,
        narrative_perspective: info.narrative_perspective,
        series: info.series,
        progress_status: info.progress_status,
        word_count: info.word_count,
        publication_status: info.publication_status,
        contract_status: info.contract_status,
        last_update_timestamp: fields::last_update(&page),
        chapter_count: fields::chapter_count(&page),
        cover_image_url: choose_cover(&page, site),
        stats: fields::stats(&page),
    }
}

/// Fetches entry pages and runs the field heuristics over them.
pub struct Extractor {
    fetcher: Arc<dyn Fetch>,
    site: SiteConfig,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn Fetch>, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, CrawlerError> {
        let page = self.fetcher.fetch(FetchRequest::page(url)).await?;
        Ok(page.text().into_owned())
    }

    /// Fetch `url` and extract every field it carries.
    ///
    /// Only the fetch can fail; a page without recognizable markers yields
    /// details with every field absent.
    pub async fn extract(&self, url: &str) -> Result<EntryDetails, CrawlerError> {
        let html = self.fetch_html(url).await?;
        let details = parse_entry_page(&html, url, &self.site);
        debug!(
            "Extracted {} from {} (tags: {}, stats: {})",
            details.title.as_deref().unwrap_or("<untitled>"),
            url,
            details.tags.is_some(),
            !details.stats.is_empty()
        );
        Ok(details)
    }

    /// Fetch `url` and pick only the cover image.
    pub async fn extract_cover(&self, url: &str) -> Result<Option<String>, CrawlerError> {
        let html = self.fetch_html(url).await?;
        let page = Page::parse(&html, url);
        Ok(choose_cover(&page, &self.site))
    }
}
