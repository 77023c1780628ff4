//! Scraper error types.

use thiserror::Error;

/// A single outbound request failed. Never carries partial content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Fetcher settings that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("crawler delays must be finite")]
    NonFiniteDelay,
    #[error("crawler.min_delay_secs must not be negative (got {0})")]
    NegativeDelay(f64),
    #[error("crawler.max_delay_secs ({max}) is below min_delay_secs ({min})")]
    InvertedDelay { min: f64, max: f64 },
}

/// Failure of the resolve-and-extract pipeline.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Neither search channel knows the title.
    #[error("no entry found for title: {0}")]
    NotFound(String),
    /// Both search channels failed; carries both causes.
    #[error("search failed (structured query: {structured}; results page: {fallback})")]
    Search {
        structured: String,
        #[source]
        fallback: FetchError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl CrawlerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
