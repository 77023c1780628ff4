//! Catalog entry model.
//!
//! An entry is one literary work on the upstream site, identified by the
//! site-assigned integer id. Every descriptive and statistical field is
//! optional: extraction is best-effort and absence is a normal state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::SearchResult;

/// Aggregate engagement statistics scraped from an entry page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStats {
    pub review_count: Option<i64>,
    pub favorite_count: Option<i64>,
    /// Site-specific engagement currency.
    pub nutrient_count: Option<i64>,
    pub total_click_count: Option<i64>,
    /// Site-assigned ranking points.
    pub score: Option<i64>,
}

impl EntryStats {
    /// True when no statistic was found.
    pub fn is_empty(&self) -> bool {
        self.review_count.is_none()
            && self.favorite_count.is_none()
            && self.nutrient_count.is_none()
            && self.total_click_count.is_none()
            && self.score.is_none()
    }
}

/// Everything known about an entry apart from its identity.
///
/// This is what the extractor produces from an entry page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    pub synopsis: Option<String>,
    /// Whitespace-delimited tag tokens.
    pub tags: Option<String>,
    pub main_characters: Option<String>,
    pub supporting_characters: Option<String>,
    pub other_notes: Option<String>,
    pub category: Option<String>,
    pub narrative_perspective: Option<String>,
    pub series: Option<String>,
    pub progress_status: Option<String>,
    pub word_count: Option<i64>,
    pub publication_status: Option<String>,
    pub contract_status: Option<String>,
    /// ISO-8601 local date-time of the latest chapter update.
    pub last_update_timestamp: Option<String>,
    pub chapter_count: Option<i64>,
    pub cover_image_url: Option<String>,
    #[serde(flatten)]
    pub stats: EntryStats,
}

macro_rules! fill_absent {
    ($target:expr, $prior:expr, $($field:ident),+ $(,)?) => {
        $(
            if $target.$field.is_none() {
                $target.$field = $prior.$field.clone();
            }
        )+
    };
}

impl EntryDetails {
    /// Fill every absent field from a previously stored record.
    ///
    /// Fields present in `self` always win.
    pub fn coalesce_with(mut self, prior: &EntryDetails) -> Self {
        fill_absent!(
            self,
            prior,
            title,
            author,
            synopsis,
            tags,
            main_characters,
            supporting_characters,
            other_notes,
            category,
            narrative_perspective,
            series,
            progress_status,
            word_count,
            publication_status,
            contract_status,
            last_update_timestamp,
            chapter_count,
            cover_image_url,
        );
        fill_absent!(
            self.stats,
            prior.stats,
            review_count,
            favorite_count,
            nutrient_count,
            total_click_count,
            score,
        );
        self
    }
}

/// A catalog record: site id plus its details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl Entry {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            details: EntryDetails::default(),
        }
    }

    /// Build an entry from a resolved search hit and the details extracted
    /// from its page. Title and author found on the page take precedence
    /// over the search hit's.
    pub fn from_extraction(hit: &SearchResult, mut details: EntryDetails) -> Self {
        if details.title.is_none() {
            details.title = Some(hit.title.clone());
        }
        if details.author.is_none() {
            details.author = hit.author.clone();
        }
        Self {
            id: hit.id,
            details,
        }
    }

    pub fn title(&self) -> &str {
        self.details.title.as_deref().unwrap_or("")
    }

    /// Distinct tag tokens of this entry.
    pub fn tag_set(&self) -> BTreeSet<&str> {
        tag_tokens(self.details.tags.as_deref()).collect()
    }
}

/// Split a tag string into its whitespace-delimited tokens.
pub fn tag_tokens(tags: Option<&str>) -> impl Iterator<Item = &str> {
    tags.unwrap_or("").split_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> SearchResult {
        SearchResult {
            id: 912073,
            title: "天涯客".to_string(),
            author: None,
            url: "https://www.jjwxc.net/onebook.php?novelid=912073".to_string(),
        }
    }

    #[test]
    fn test_from_extraction_prefers_page_fields() {
        let details = EntryDetails {
            title: Some("天涯客（完结）".to_string()),
            author: Some("priest".to_string()),
            ..Default::default()
        };
        let entry = Entry::from_extraction(&hit(), details);
        assert_eq!(entry.id, 912073);
        assert_eq!(entry.title(), "天涯客（完结）");
        assert_eq!(entry.details.author.as_deref(), Some("priest"));
    }

    #[test]
    fn test_from_extraction_falls_back_to_hit() {
        let entry = Entry::from_extraction(&hit(), EntryDetails::default());
        assert_eq!(entry.title(), "天涯客");
        assert_eq!(entry.details.author, None);
    }

    #[test]
    fn test_coalesce_keeps_fresh_values() {
        let prior = EntryDetails {
            tags: Some("强强 江湖".to_string()),
            category: Some("原创-纯爱-架空历史-爱情".to_string()),
            stats: EntryStats {
                score: Some(100),
                review_count: Some(5),
                ..Default::default()
            },
            ..Default::default()
        };
        let fresh = EntryDetails {
            tags: Some("正剧".to_string()),
            stats: EntryStats {
                score: Some(200),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = fresh.coalesce_with(&prior);
        assert_eq!(merged.tags.as_deref(), Some("正剧"));
        assert_eq!(merged.category.as_deref(), Some("原创-纯爱-架空历史-爱情"));
        assert_eq!(merged.stats.score, Some(200));
        assert_eq!(merged.stats.review_count, Some(5));
    }

    #[test]
    fn test_tag_set_ignores_extra_whitespace() {
        let mut entry = Entry::new(1);
        entry.details.tags = Some("  强强  江湖 强强\t正剧 ".to_string());
        let tags: Vec<_> = entry.tag_set().into_iter().collect();
        assert_eq!(tags.len(), 3);
        assert!(tags.contains(&"江湖"));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let mut entry = Entry::new(7);
        entry.details.title = Some("镇魂".to_string());
        entry.details.stats.score = Some(42);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "镇魂");
        assert_eq!(json["score"], 42);
        assert!(json["tags"].is_null());
    }
}
