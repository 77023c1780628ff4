//! Scraper configuration types.
//!
//! `SiteConfig` holds every upstream URL and host list so the pipeline can be
//! pointed at a different origin (a mirror, or a stub server in tests).
//! `FetchConfig` holds the fetcher's anti-throttling policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ConfigError;
use super::http_client::DEFAULT_USER_AGENTS;

/// Upstream site layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin of the content site, without trailing slash.
    pub base_url: String,
    /// JSON search endpoint, relative to `base_url`.
    pub search_api_path: String,
    /// Rendered search results page, relative to `base_url`.
    pub search_page_path: String,
    /// Entry page, relative to `base_url`.
    pub entry_path: String,
    /// Hosts (and their subdomains) that serve durable first-party assets.
    pub first_party_domains: Vec<String>,
    /// Image hosts whose links are known to expire.
    pub unstable_image_hosts: Vec<String>,
    /// Dynamic cover endpoint keyed by entry id.
    pub cover_endpoint: String,
    /// Hosts the image proxy is willing to fetch from.
    pub proxy_allowed_domains: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.jjwxc.net".to_string(),
            search_api_path: "search/search_ajax.php".to_string(),
            search_page_path: "search.php".to_string(),
            entry_path: "onebook.php".to_string(),
            first_party_domains: vec!["jjwxc.net".to_string()],
            unstable_image_hosts: vec![
                "sinaimg.cn".to_string(),
                "sinaimg.com".to_string(),
                "qpic.cn".to_string(),
            ],
            cover_endpoint: "https://i9-static.jjwxc.net/novelimage.php".to_string(),
            proxy_allowed_domains: [
                "sinaimg.cn",
                "jjwxc.net",
                "bmp.ovh",
                "loli.net",
                "jd.com",
                "huluxia.com",
                "bdstatic.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl SiteConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Canonical page URL of an entry.
    pub fn entry_url(&self, id: i64) -> String {
        format!("{}/{}?novelid={}", self.base(), self.entry_path, id)
    }

    /// JSON search endpoint with the title escaped as UTF-8.
    pub fn search_api_url(&self, title: &str) -> String {
        format!(
            "{}/{}?action=search&keywords={}&type=1&getfull=1",
            self.base(),
            self.search_api_path,
            urlencoding::encode(title)
        )
    }

    /// Rendered results page with the title escaped in the site's legacy encoding.
    pub fn search_page_url(&self, title: &str) -> String {
        let (bytes, _, _) = encoding_rs::GB18030.encode(title);
        format!(
            "{}/{}?kw={}&t=1",
            self.base(),
            self.search_page_path,
            urlencoding::encode_binary(&bytes)
        )
    }

    /// Referer sent with search requests.
    pub fn search_referer(&self) -> String {
        format!("{}/{}", self.base(), self.search_page_path)
    }

    /// First-party dynamic cover URL for an entry.
    pub fn cover_url(&self, id: i64) -> String {
        format!("{}?novelid={}", self.cover_endpoint, id)
    }

    /// Whether a URL is hosted on one of the first-party domains.
    pub fn is_first_party(&self, url: &str) -> bool {
        host_matches(url, &self.first_party_domains)
    }

    /// Whether a URL is hosted on a known-unstable image host.
    pub fn is_unstable_image_host(&self, url: &str) -> bool {
        host_matches(url, &self.unstable_image_hosts)
    }

    /// Whether the image proxy may fetch a URL.
    pub fn is_proxy_allowed(&self, url: &str) -> bool {
        host_matches(url, &self.proxy_allowed_domains)
    }
}

/// True if the URL's host equals one of `domains` or is a subdomain of one.
pub fn host_matches(url: &str, domains: &[String]) -> bool {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    else {
        return false;
    };
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}

/// Fetcher policy: randomized pre-request delay, timeout and header pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Lower bound of the pre-request delay, in seconds.
    pub min_delay_secs: f64,
    /// Upper bound of the pre-request delay, in seconds.
    pub max_delay_secs: f64,
    /// Per-request transport timeout, in seconds.
    pub timeout_secs: u64,
    /// User-Agent pool; one is picked uniformly per request.
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 2.0,
            max_delay_secs: 3.0,
            timeout_secs: 15,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FetchConfig {
    /// Config with no delay, for tests and local stubs.
    pub fn immediate() -> Self {
        Self {
            min_delay_secs: 0.0,
            max_delay_secs: 0.0,
            timeout_secs: 5,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the delay window is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_delay_secs.is_finite() && self.max_delay_secs.is_finite()) {
            return Err(ConfigError::NonFiniteDelay);
        }
        if self.min_delay_secs < 0.0 {
            return Err(ConfigError::NegativeDelay(self.min_delay_secs));
        }
        if self.max_delay_secs < self.min_delay_secs {
            return Err(ConfigError::InvertedDelay {
                min: self.min_delay_secs,
                max: self.max_delay_secs,
            });
        }
        Ok(())
    }
}
