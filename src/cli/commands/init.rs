//! Initialize command.

use console::style;

use super::helpers::open_store;
use crate::config::Settings;

/// Create the catalog database and its schema.
pub fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_store(settings)?;
    let count = repo.count()?;

    println!(
        "{} Initialized catalog at {}",
        style("✓").green(),
        settings.database.path.display()
    );
    if count > 0 {
        println!("  {} entries already stored", count);
    }
    Ok(())
}
