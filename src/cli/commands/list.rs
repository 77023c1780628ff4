//! List command.

use console::style;

use super::helpers::open_store;
use crate::config::Settings;
use crate::models::format_word_count;
use crate::repository::EntryStore;

/// List stored entries, filtered by keyword when given.
pub fn cmd_list(settings: &Settings, keyword: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let repo = open_store(settings)?;
    let entries = match keyword.filter(|k| !k.trim().is_empty()) {
        Some(keyword) => repo.search_fuzzy(keyword, limit)?,
        None => repo.list_all(None, Some(limit))?,
    };

    if entries.is_empty() {
        println!("{} No entries stored", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Catalog").bold());
    println!("{}", "-".repeat(72));
    println!("{:<10} {:<24} {:<14} {:<10} Tags", "ID", "Title", "Author", "Length");
    println!("{}", "-".repeat(72));
    for entry in &entries {
        println!(
            "{:<10} {:<24} {:<14} {:<10} {}",
            entry.id,
            entry.title(),
            entry.details.author.as_deref().unwrap_or("-"),
            format_word_count(entry.details.word_count),
            entry.details.tags.as_deref().unwrap_or("")
        );
    }
    println!("{}", "-".repeat(72));
    println!("{} of {} entries", entries.len(), repo.count()?);
    Ok(())
}
