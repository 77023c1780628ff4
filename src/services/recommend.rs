//! Ranking orchestrator.
//!
//! Scores every stored entry against a target, keeps the best matches and
//! backfills missing covers for the ones actually returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cover::normalize_cover_url;
use super::similarity::{similarity, WeightConfig};
use crate::models::{Entry, Recommendation, RecommendationSummary, SimilarityResult, TargetSummary};
use crate::repository::{EntryStore, RepositoryError};
use crate::scrapers::{Extractor, Fetch, SiteConfig};

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The target id has no stored entry.
    #[error("entry {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Recommendation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub weights: WeightConfig,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Fill fields missing from a re-crawl with the previously stored values.
    pub merge_on_recrawl: bool,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            default_limit: 10,
            max_limit: 50,
            merge_on_recrawl: false,
        }
    }
}

impl RecommendationConfig {
    /// Clamp a requested limit to `[1, max_limit]`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// Score, sort and truncate candidates.
///
/// Candidates scoring zero are dropped. Equal scores keep their input order.
pub fn rank_candidates(
    target: &Entry,
    candidates: Vec<Entry>,
    limit: usize,
    weights: &WeightConfig,
) -> Vec<(Entry, SimilarityResult)> {
    let mut scored: Vec<(Entry, SimilarityResult)> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != target.id)
        .map(|candidate| {
            let result = similarity(target, &candidate, weights);
            (candidate, result)
        })
        .filter(|(_, result)| result.score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
    scored.truncate(limit);
    scored
}

pub struct Recommender {
    store: Arc<dyn EntryStore>,
    extractor: Extractor,
    site: SiteConfig,
    config: RecommendationConfig,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn EntryStore>,
        fetcher: Arc<dyn Fetch>,
        site: SiteConfig,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            store,
            extractor: Extractor::new(fetcher, site.clone()),
            site,
            config,
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Rank the stored catalog against `target_id`.
    pub async fn rank(
        &self,
        target_id: i64,
        limit: usize,
    ) -> Result<Vec<(Entry, SimilarityResult)>, RecommendError> {
        let (_, ranked) = self.rank_with_target(target_id, limit).await?;
        Ok(ranked)
    }

    /// Ranked recommendations in caller-facing form.
    pub async fn summary(
        &self,
        target_id: i64,
        limit: Option<usize>,
    ) -> Result<RecommendationSummary, RecommendError> {
        let limit = self.config.clamp_limit(limit);
        let (target, ranked) = self.rank_with_target(target_id, limit).await?;

        let recommendations = ranked
            .into_iter()
            .map(|(entry, result)| {
                let url = self.site.entry_url(entry.id);
                Recommendation::new(entry, result, url)
            })
            .collect();

        Ok(RecommendationSummary {
            target: TargetSummary::from(&target),
            recommendations,
        })
    }

    async fn rank_with_target(
        &self,
        target_id: i64,
        limit: usize,
    ) -> Result<(Entry, Vec<(Entry, SimilarityResult)>), RecommendError> {
        let target = self
            .store
            .find_by_id(target_id)?
            .ok_or(RecommendError::NotFound(target_id))?;
        let pool = self.store.list_all(Some(target_id), None)?;
        let pool_size = pool.len();

        let mut ranked = rank_candidates(&target, pool, limit, &self.config.weights);
        info!(
            "Ranked {} of {} candidates for entry {}",
            ranked.len(),
            pool_size,
            target_id
        );

        for (entry, _) in ranked.iter_mut() {
            if entry.details.cover_image_url.is_none() {
                self.backfill_cover(entry).await;
            }
        }

        Ok((target, ranked))
    }

    /// Best-effort cover lookup. Failures are logged and leave the entry as is.
    async fn backfill_cover(&self, entry: &mut Entry) {
        let url = self.site.entry_url(entry.id);
        let cover = match self.extractor.extract_cover(&url).await {
            Ok(Some(cover)) => cover,
            Ok(None) => {
                debug!("No cover found for entry {}", entry.id);
                return;
            }
            Err(e) => {
                warn!("Cover backfill failed for entry {}: {}", entry.id, e);
                return;
            }
        };

        let Some(cover) = normalize_cover_url(Some(&cover), entry.id, &self.site) else {
            return;
        };
        if let Err(e) = self.store.set_cover(entry.id, &cover) {
            warn!("Failed to store backfilled cover for entry {}: {}", entry.id, e);
        }
        entry.details.cover_image_url = Some(cover);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDetails;
    use crate::scrapers::stub::StubFetcher;
    use crate::services::testing::MemoryStore;

    fn entry(id: i64, tags: &str, perspective: &str, cover: Option<&str>) -> Entry {
        Entry {
            id,
            details: EntryDetails {
                title: Some(format!("书{id}")),
                tags: Some(tags.to_string()),
                narrative_perspective: Some(perspective.to_string()),
                cover_image_url: cover.map(str::to_string),
                ..Default::default()
            },
        }
    }

    fn covered(id: i64, tags: &str, perspective: &str) -> Entry {
        let cover = "https://i9-static.jjwxc.net/novelimage.php?novelid=1";
        entry(id, tags, perspective, Some(cover))
    }

    #[test]
    fn test_rank_candidates_properties() {
        let target = covered(1, "强强 江湖 正剧", "主受");
        let pool = vec![
            covered(2, "强强", "主攻"),
            covered(3, "无关", "主攻"),
            covered(4, "强强 江湖 正剧", "主受"),
            covered(5, "江湖", "主攻"),
            covered(6, "强强 江湖", "主受"),
        ];

        let ranked = rank_candidates(&target, pool.clone(), 3, &WeightConfig::default());
        let ids: Vec<i64> = ranked.iter().map(|(e, _)| e.id).collect();
        assert_eq!(ids, vec![4, 6, 2]);
        assert!(ranked.windows(2).all(|w| w[0].1.score >= w[1].1.score));

        let all = rank_candidates(&target, pool, 10, &WeightConfig::default());
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|(_, r)| r.score > 0.0));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let target = covered(1, "强强", "主受");
        let pool = vec![covered(7, "强强", "主攻"), covered(3, "强强", "主攻")];
        let ranked = rank_candidates(&target, pool, 10, &WeightConfig::default());
        let ids: Vec<i64> = ranked.iter().map(|(e, _)| e.id).collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn test_clamp_limit() {
        let config = RecommendationConfig::default();
        assert_eq!(config.clamp_limit(None), 10);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(500)), 50);
        assert_eq!(config.clamp_limit(Some(7)), 7);
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let store = MemoryStore::with(vec![covered(1, "强强", "主受")]);
        let recommender = Recommender::new(
            store,
            StubFetcher::new(vec![]),
            SiteConfig::default(),
            RecommendationConfig::default(),
        );
        let err = recommender.rank(99, 5).await.unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(99)));
    }

    #[tokio::test]
    async fn test_cover_backfill() {
        let store = MemoryStore::with(vec![
            covered(1, "强强 江湖", "主受"),
            entry(2, "强强", "主受", None),
            entry(3, "江湖", "主受", None),
        ]);
        let fetcher = StubFetcher::new(vec![
            (
                "novelid=2",
                Ok(r#"<img itemprop="image" src="https://tva1.sinaimg.cn/2.jpg">"#.to_string()),
            ),
            ("novelid=3", Err(503)),
        ]);
        let recommender = Recommender::new(
            store.clone(),
            fetcher.clone(),
            SiteConfig::default(),
            RecommendationConfig::default(),
        );

        let summary = recommender.summary(1, None).await.unwrap();
        assert_eq!(summary.target.id, 1);
        assert_eq!(summary.recommendations.len(), 2);

        let backfilled = &summary.recommendations[0];
        assert_eq!(backfilled.entry.id, 2);
        assert_eq!(
            backfilled.entry.details.cover_image_url.as_deref(),
            Some("https://i9-static.jjwxc.net/novelimage.php?novelid=2")
        );
        assert_eq!(backfilled.url, "https://www.jjwxc.net/onebook.php?novelid=2");
        assert_eq!(
            store.get(2).unwrap().details.cover_image_url,
            backfilled.entry.details.cover_image_url
        );
        // Only the cover is written back, never a full row.
        assert_eq!(store.upserts(), 0);

        // A failed backfill keeps the candidate without a cover.
        let failed = &summary.recommendations[1];
        assert_eq!(failed.entry.id, 3);
        assert_eq!(failed.entry.details.cover_image_url, None);
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_backfill_skipped_when_cover_known() {
        let store = MemoryStore::with(vec![
            covered(1, "强强", "主受"),
            covered(2, "强强", "主受"),
        ]);
        let fetcher = StubFetcher::new(vec![]);
        let recommender = Recommender::new(
            store,
            fetcher.clone(),
            SiteConfig::default(),
            RecommendationConfig::default(),
        );

        let ranked = recommender.rank(1, 10).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(fetcher.calls().is_empty());
    }
}
