//! Title search: stored catalog first, upstream site second.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::cover::normalize_cover_url;
use crate::models::{Entry, EntrySource, SearchOutcome};
use crate::repository::{EntryStore, RepositoryError};
use crate::scrapers::{CrawlerError, Extractor, Fetch, Resolver, SiteConfig};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no entry found for title: {0}")]
    NotFound(String),
    #[error(transparent)]
    Crawler(CrawlerError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl From<CrawlerError> for CatalogError {
    fn from(err: CrawlerError) -> Self {
        match err {
            CrawlerError::NotFound(title) => Self::NotFound(title),
            other => Self::Crawler(other),
        }
    }
}

/// Ingestion path from a free-text title to a stored entry.
pub struct CatalogService {
    store: Arc<dyn EntryStore>,
    resolver: Resolver,
    extractor: Extractor,
    site: SiteConfig,
    merge_on_recrawl: bool,
}

impl CatalogService {
    pub fn new(store: Arc<dyn EntryStore>, fetcher: Arc<dyn Fetch>, site: SiteConfig) -> Self {
        Self {
            store,
            resolver: Resolver::new(fetcher.clone(), site.clone()),
            extractor: Extractor::new(fetcher, site.clone()),
            site,
            merge_on_recrawl: false,
        }
    }

    /// Fill fields a re-crawl did not find from the stored row.
    pub fn with_merge_on_recrawl(mut self, enabled: bool) -> Self {
        self.merge_on_recrawl = enabled;
        self
    }

    /// Look a title up, crawling and storing it when the catalog lacks it.
    ///
    /// A failure to store the fresh entry is logged; the entry is still
    /// returned.
    pub async fn search(&self, title: &str) -> Result<SearchOutcome, CatalogError> {
        let title = title.trim();
        if let Some(entry) = self.store.find_by_title(title)? {
            let url = self.site.entry_url(entry.id);
            return Ok(SearchOutcome::new(entry, url, EntrySource::Stored));
        }

        info!("Title {:?} not in catalog, resolving upstream", title);
        let hit = self.resolver.resolve(title).await?;
        let details = self.extractor.extract(&hit.url).await?;

        let mut entry = Entry::from_extraction(&hit, details);
        entry.details.cover_image_url = normalize_cover_url(
            entry.details.cover_image_url.as_deref(),
            entry.id,
            &self.site,
        );
        if self.merge_on_recrawl {
            entry = self.merge_with_stored(entry);
        }

        if let Err(e) = self.store.upsert(&entry) {
            warn!("Failed to store entry {}: {}", entry.id, e);
        }

        Ok(SearchOutcome::new(entry, hit.url, EntrySource::FreshlyResolved))
    }

    fn merge_with_stored(&self, entry: Entry) -> Entry {
        match self.store.find_by_id(entry.id) {
            Ok(Some(prior)) => Entry {
                id: entry.id,
                details: entry.details.coalesce_with(&prior.details),
            },
            Ok(None) => entry,
            Err(e) => {
                warn!("Could not read stored entry {} for merge: {}", entry.id, e);
                entry
            }
        }
    }
}
