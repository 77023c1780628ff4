//! Search command.

use console::style;

use super::helpers::{http_client, open_store, print_entry};
use crate::config::Settings;
use crate::services::{CatalogError, CatalogService};

/// Look a title up, crawling it when the catalog lacks it.
pub async fn cmd_search(settings: &Settings, title: &str, merge: bool) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let client = http_client(settings)?;
    let service = CatalogService::new(store, client, settings.site.clone())
        .with_merge_on_recrawl(merge || settings.recommendation.merge_on_recrawl);

    println!("{} Searching for {}...", style("→").cyan(), style(title).bold());
    match service.search(title).await {
        Ok(outcome) => {
            println!(
                "{} Found ({})",
                style("✓").green(),
                outcome.source.as_str()
            );
            print_entry(&outcome.entry.entry, &outcome.entry.url);
            Ok(())
        }
        Err(CatalogError::NotFound(title)) => {
            println!("{} No entry found for '{}'", style("✗").red(), title);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
