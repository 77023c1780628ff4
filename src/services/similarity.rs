//! Pairwise similarity between catalog entries.
//!
//! Four dimensions contribute a weighted share of the score: tag overlap
//! (Jaccard), then exact matches on category, narrative perspective and
//! author. Progress status is deliberately not a dimension.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{tag_tokens, Entry, SimilarityResult};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Shared tags named in a reason before it is abbreviated.
const REASON_TAG_LIMIT: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight `{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("weights must sum to 1.0, got {0}")]
    Sum(f64),
}

/// Per-dimension weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub tags: f64,
    pub category: f64,
    pub perspective: f64,
    pub author: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            tags: 0.55,
            category: 0.18,
            perspective: 0.17,
            author: 0.10,
        }
    }
}

impl WeightConfig {
    pub fn validate(&self) -> Result<(), WeightError> {
        for (name, value) in [
            ("tags", self.tags),
            ("category", self.category),
            ("perspective", self.perspective),
            ("author", self.author),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(WeightError::Negative { name, value });
            }
        }
        let sum = self.tags + self.category + self.perspective + self.author;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(WeightError::Sum(sum));
        }
        Ok(())
    }
}

/// Jaccard similarity of two tag strings. Zero if either side has no tags.
pub fn jaccard(a: Option<&str>, b: Option<&str>) -> f64 {
    let a: BTreeSet<&str> = tag_tokens(a).collect();
    let b: BTreeSet<&str> = tag_tokens(b).collect();
    jaccard_sets(&a, &b)
}

fn jaccard_sets(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.union(b).count();
    shared as f64 / union as f64
}

/// Exactly equal non-empty values on both sides.
fn same_value<'a>(a: Option<&'a str>, b: Option<&str>) -> Option<&'a str> {
    match (a, b) {
        (Some(x), Some(y)) if !x.is_empty() && x == y => Some(x),
        _ => None,
    }
}

fn shared_tags_reason(a: &Entry, b_tags: &BTreeSet<&str>) -> String {
    let mut seen = BTreeSet::new();
    let shared: Vec<&str> = tag_tokens(a.details.tags.as_deref())
        .filter(|t| b_tags.contains(t) && seen.insert(*t))
        .collect();
    let mut reason = format!(
        "标签相似：{}",
        shared
            .iter()
            .take(REASON_TAG_LIMIT)
            .copied()
            .collect::<Vec<_>>()
            .join("、")
    );
    if shared.len() > REASON_TAG_LIMIT {
        reason.push('等');
    }
    reason
}

/// Score `b` against `a` on a 0-100 scale with human-readable reasons.
pub fn similarity(a: &Entry, b: &Entry, weights: &WeightConfig) -> SimilarityResult {
    let mut total = 0.0;
    let mut reasons = Vec::new();

    let a_tags = a.tag_set();
    let b_tags = b.tag_set();
    let tag_score = jaccard_sets(&a_tags, &b_tags) * weights.tags;
    if tag_score > 0.0 {
        total += tag_score;
        reasons.push(shared_tags_reason(a, &b_tags));
    }

    let a = &a.details;
    let b = &b.details;
    if let Some(category) = same_value(a.category.as_deref(), b.category.as_deref()) {
        total += weights.category;
        reasons.push(format!("类型相同：{category}"));
    }
    if let Some(perspective) = same_value(
        a.narrative_perspective.as_deref(),
        b.narrative_perspective.as_deref(),
    ) {
        total += weights.perspective;
        reasons.push(format!("视角相同：{perspective}"));
    }
    if let Some(author) = same_value(a.author.as_deref(), b.author.as_deref()) {
        total += weights.author;
        reasons.push(format!("同作者：{author}"));
    }

    SimilarityResult {
        score: (total * 100.0).clamp(0.0, 100.0),
        reasons,
    }
}
