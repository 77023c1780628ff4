//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::models::{format_number, format_word_count, Entry};
use crate::repository::EntryRepository;
use crate::scrapers::HttpClient;

/// Open the catalog database named in the settings.
pub fn open_store(settings: &Settings) -> anyhow::Result<Arc<EntryRepository>> {
    let repo = EntryRepository::new(&settings.database.path).with_context(|| {
        format!(
            "failed to open database {}",
            settings.database.path.display()
        )
    })?;
    Ok(Arc::new(repo))
}

/// Build the rate-limited upstream client.
pub fn http_client(settings: &Settings) -> anyhow::Result<Arc<HttpClient>> {
    let client = HttpClient::new(settings.crawler.clone()).context("failed to build HTTP client")?;
    Ok(Arc::new(client))
}

fn field(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn count(value: Option<i64>) -> String {
    value.map(format_number).unwrap_or_else(|| "-".to_string())
}

/// Print an entry's details block.
pub fn print_entry(entry: &Entry, url: &str) {
    let d = &entry.details;
    println!(
        "\n{} {}",
        style(entry.title()).bold(),
        style(format!("#{}", entry.id)).dim()
    );
    println!("  Author:      {}", field(d.author.as_deref()));
    println!("  Category:    {}", field(d.category.as_deref()));
    println!("  Perspective: {}", field(d.narrative_perspective.as_deref()));
    println!("  Progress:    {}", field(d.progress_status.as_deref()));
    println!("  Length:      {}", format_word_count(d.word_count));
    println!("  Tags:        {}", field(d.tags.as_deref()));
    if let Some(main) = &d.main_characters {
        println!("  Characters:  {}", main);
    }
    println!(
        "  Favorites:   {}   Reviews: {}   Score: {}",
        count(d.stats.favorite_count),
        count(d.stats.review_count),
        count(d.stats.score)
    );
    if let Some(updated) = &d.last_update_timestamp {
        println!("  Updated:     {}", updated);
    }
    println!("  {}", style(url).cyan().underlined());
}
