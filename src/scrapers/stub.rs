//! Canned fetcher for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::FetchError;
use super::http_client::{Fetch, FetchRequest, FetchedPage, PageEncoding};

/// Answers requests by URL substring; unmatched URLs get HTTP 404.
///
/// Bodies are encoded with the encoding the request declares.
pub struct StubFetcher {
    routes: Vec<(&'static str, Result<String, u16>)>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(routes: Vec<(&'static str, Result<String, u16>)>) -> Arc<Self> {
        Arc::new(Self {
            routes,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(request.url.to_string());
        let route = self
            .routes
            .iter()
            .find(|(needle, _)| request.url.contains(needle));
        match route {
            Some((_, Ok(body))) => {
                let bytes = match request.encoding {
                    PageEncoding::Utf8 => body.as_bytes().to_vec(),
                    PageEncoding::Gb18030 => encoding_rs::GB18030.encode(body).0.into_owned(),
                };
                Ok(FetchedPage::new(request.url, bytes, request.encoding))
            }
            Some((_, Err(status))) => Err(FetchError::Status {
                url: request.url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: request.url.to_string(),
                status: 404,
            }),
        }
    }
}
