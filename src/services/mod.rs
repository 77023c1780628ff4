//! Service layer for novelmind business logic.
//!
//! Services sit between the scrapers and the store and are shared by the
//! CLI and the web server.

pub mod catalog;
pub mod cover;
pub mod recommend;
pub mod similarity;
#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CatalogError, CatalogService};
pub use cover::normalize_cover_url;
pub use recommend::{rank_candidates, RecommendError, RecommendationConfig, Recommender};
pub use similarity::{jaccard, similarity, WeightConfig, WeightError};
