//! Recommend command.

use console::style;

use super::helpers::{http_client, open_store};
use crate::config::Settings;
use crate::services::{RecommendError, Recommender};

/// Print entries similar to `id`.
pub async fn cmd_recommend(
    settings: &Settings,
    id: i64,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let client = http_client(settings)?;
    let recommender = Recommender::new(
        store,
        client,
        settings.site.clone(),
        settings.recommendation.clone(),
    );

    let summary = match recommender.summary(id, limit).await {
        Ok(summary) => summary,
        Err(RecommendError::NotFound(id)) => {
            println!(
                "{} Entry {} is not in the catalog; search for it first",
                style("✗").red(),
                id
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "\n{} {}",
        style("Similar to").bold(),
        style(summary.target.title.as_deref().unwrap_or("?")).bold()
    );
    if summary.recommendations.is_empty() {
        println!("  {} No similar entries stored yet", style("!").yellow());
        return Ok(());
    }

    println!("{}", "-".repeat(60));
    for (rank, rec) in summary.recommendations.iter().enumerate() {
        println!(
            "{:>2}. {} {} {}",
            rank + 1,
            style(format!("{:>6.2}", rec.similarity_score)).green(),
            rec.entry.title(),
            style(rec.entry.details.author.as_deref().unwrap_or("")).dim()
        );
        if !rec.match_reasons.is_empty() {
            println!("      {}", rec.match_reasons.join(" | "));
        }
        println!("      {}", style(&rec.url).cyan());
    }
    Ok(())
}
