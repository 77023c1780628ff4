//! Rate-limited HTTP fetcher.
//!
//! Every request sleeps a uniformly random delay from the configured window
//! before it is sent and carries a User-Agent drawn from a fixed pool. The
//! randomness source is injected so tests can make both deterministic.

mod response;
mod user_agent;

pub use response::{FetchRequest, FetchedPage, PageEncoding, PassthroughResponse};
pub use user_agent::{pick_user_agent, DEFAULT_USER_AGENTS, USER_AGENT};

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT as UA_HEADER};
use reqwest::Client;
use tracing::debug;

use super::config::FetchConfig;
use super::error::FetchError;

/// Something that can perform one outbound GET.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchError>;
}

/// Draw a delay uniformly from `[min_secs, max_secs]`.
pub fn random_delay(min_secs: f64, max_secs: f64, rng: &mut dyn RngCore) -> Duration {
    let min = min_secs.max(0.0);
    if max_secs <= min {
        return Duration::from_secs_f64(min);
    }
    Duration::from_secs_f64(rng.gen_range(min..=max_secs))
}

/// HTTP client applying the fixed anti-throttling policy.
pub struct HttpClient {
    client: Client,
    config: FetchConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl HttpClient {
    /// Create a client seeded from OS entropy.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a client with an explicit randomness source.
    pub fn with_rng(
        config: FetchConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            config,
            rng: Mutex::new(Box::new(rng)),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Delay and User-Agent for the next request.
    fn next_identity(&self) -> (Duration, String) {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let delay = random_delay(
            self.config.min_delay_secs,
            self.config.max_delay_secs,
            &mut **rng,
        );
        let user_agent = pick_user_agent(&self.config.user_agents, &mut **rng).to_string();
        (delay, user_agent)
    }

    /// Fetch without the pre-request delay. Used for image pass-through only.
    pub async fn fetch_passthrough(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<PassthroughResponse, FetchError> {
        let (_, user_agent) = self.next_identity();
        let mut request = self
            .client
            .get(url)
            .header(UA_HEADER, user_agent)
            .header(ACCEPT, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8");
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })?;

        Ok(PassthroughResponse {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchError> {
        let (delay, user_agent) = self.next_identity();
        if !delay.is_zero() {
            debug!("Waiting {:?} before fetching {}", delay, request.url);
            tokio::time::sleep(delay).await;
        }

        let accept = if request.xhr {
            "application/json, text/javascript, */*; q=0.01"
        } else {
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
        };
        let mut builder = self
            .client
            .get(request.url)
            .header(UA_HEADER, user_agent)
            .header(ACCEPT, accept)
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9");
        if let Some(referer) = request.referer {
            builder = builder.header(REFERER, referer);
        }
        if request.xhr {
            builder = builder.header("X-Requested-With", "XMLHttpRequest");
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(request.url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: request.url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: request.url.to_string(),
                    source: e,
                }
            }
        })?;
        debug!("Fetched {} ({} bytes)", request.url, bytes.len());

        Ok(FetchedPage {
            url: request.url.to_string(),
            status: status.as_u16(),
            bytes: bytes.to_vec(),
            encoding: request.encoding,
        })
    }
}
