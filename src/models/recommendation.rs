//! Similarity and recommendation result types.

use serde::Serialize;

use super::Entry;

/// Outcome of comparing two entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Weighted score in `[0, 100]`.
    pub score: f64,
    /// Human-readable reasons in dimension order (tags, category, perspective, author).
    pub reasons: Vec<String>,
}

impl SimilarityResult {
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            reasons: Vec::new(),
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub entry: Entry,
    /// Score rounded to two decimals for display.
    pub similarity_score: f64,
    pub match_reasons: Vec<String>,
    pub url: String,
}

impl Recommendation {
    pub fn new(entry: Entry, similarity: SimilarityResult, url: String) -> Self {
        Self {
            entry,
            similarity_score: (similarity.score * 100.0).round() / 100.0,
            match_reasons: similarity.reasons,
            url,
        }
    }
}

/// Short description of the entry recommendations were computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
}

impl From<&Entry> for TargetSummary {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.details.title.clone(),
            author: entry.details.author.clone(),
            category: entry.details.category.clone(),
            tags: entry.details.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub target: TargetSummary,
    pub recommendations: Vec<Recommendation>,
}
