//! Upstream site access: fetching, title resolution and page extraction.

pub mod config;
pub mod error;
pub mod extractor;
pub mod http_client;
pub mod resolver;
#[cfg(test)]
pub(crate) mod stub;

pub use config::{FetchConfig, SiteConfig};
pub use error::{ConfigError, CrawlerError, FetchError};
pub use extractor::{parse_entry_page, Extractor};
pub use http_client::{Fetch, FetchRequest, FetchedPage, HttpClient, PageEncoding};
pub use resolver::Resolver;
