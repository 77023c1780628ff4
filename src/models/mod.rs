//! Data models for novelmind.

mod entry;
mod format;
mod recommendation;
mod search;

pub use entry::{tag_tokens, Entry, EntryDetails, EntryStats};
pub use format::{format_number, format_word_count};
pub use recommendation::{Recommendation, RecommendationSummary, SimilarityResult, TargetSummary};
pub use search::{EntrySource, LinkedEntry, SearchOutcome, SearchResult};
