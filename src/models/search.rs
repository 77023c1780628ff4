//! Search results and outcomes of the ingestion path.

use serde::{Deserialize, Serialize};

use super::{Entry, EntryStats};

/// First hit returned by the resolver for a free-text title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    /// Absent when only the results page was available and it had no author link.
    pub author: Option<String>,
    /// Canonical entry page.
    pub url: String,
}

/// Where a search answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySource {
    #[serde(rename = "stored")]
    Stored,
    #[serde(rename = "freshly-resolved")]
    FreshlyResolved,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::FreshlyResolved => "freshly-resolved",
        }
    }
}

/// An entry together with its canonical page URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub url: String,
}

/// Answer to a title search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    #[serde(rename = "data")]
    pub entry: LinkedEntry,
    /// Statistics subset, duplicated for callers that only display counters.
    pub stats: EntryStats,
    pub source: EntrySource,
}

impl SearchOutcome {
    pub fn new(entry: Entry, url: String, source: EntrySource) -> Self {
        let stats = entry.details.stats.clone();
        Self {
            entry: LinkedEntry { entry, url },
            stats,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_shape() {
        let mut entry = Entry::new(3);
        entry.details.stats.favorite_count = Some(12);
        let outcome = SearchOutcome::new(
            entry,
            "https://www.jjwxc.net/onebook.php?novelid=3".to_string(),
            EntrySource::FreshlyResolved,
        );

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"], "freshly-resolved");
        assert_eq!(json["data"]["id"], 3);
        assert_eq!(json["data"]["url"], "https://www.jjwxc.net/onebook.php?novelid=3");
        assert_eq!(json["stats"]["favorite_count"], 12);
        assert!(json["stats"]["score"].is_null());
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(EntrySource::Stored.as_str(), "stored");
        assert_eq!(
            serde_json::to_value(EntrySource::Stored).unwrap(),
            serde_json::json!("stored")
        );
    }
}
