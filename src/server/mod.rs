//! JSON API server.
//!
//! Exposes title search, recommendations and an image proxy over HTTP.
//! Handlers are thin: all behavior lives in the services.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::repository::{EntryRepository, EntryStore};
use crate::scrapers::{Fetch, HttpClient, SiteConfig};
use crate::services::{CatalogService, Recommender};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub recommender: Arc<Recommender>,
    /// Client used for undelayed image pass-through.
    pub images: Arc<HttpClient>,
    pub site: SiteConfig,
}

impl AppState {
    pub fn new(settings: &Settings, repo: Arc<EntryRepository>) -> anyhow::Result<Self> {
        let client = Arc::new(HttpClient::new(settings.crawler.clone())?);
        Ok(Self::with_parts(settings, repo, client.clone(), client))
    }

    /// Assemble state from an explicit store and fetchers.
    pub fn with_parts(
        settings: &Settings,
        store: Arc<dyn EntryStore>,
        fetcher: Arc<dyn Fetch>,
        images: Arc<HttpClient>,
    ) -> Self {
        let catalog = CatalogService::new(store.clone(), fetcher.clone(), settings.site.clone())
            .with_merge_on_recrawl(settings.recommendation.merge_on_recrawl);
        let recommender = Recommender::new(
            store,
            fetcher,
            settings.site.clone(),
            settings.recommendation.clone(),
        );
        Self {
            catalog: Arc::new(catalog),
            recommender: Arc::new(recommender),
            images,
            site: settings.site.clone(),
        }
    }
}

/// Start the web server.
pub async fn serve(
    settings: &Settings,
    repo: Arc<EntryRepository>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let state = AppState::new(settings, repo)?;
    let app = create_router(state, &settings.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
