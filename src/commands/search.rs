use anyhow::{Context, Result};

use tablewatch::config::Config;
use tablewatch::models::RestaurantSummary;
use tablewatch::opentable::OpenTableClient;
use tablewatch::utils::truncate_label;

/// One fixed-width menu row: `name | neighborhood | metro | country | type | id`
pub fn menu_label(r: &RestaurantSummary) -> String {
    format!(
        "{:<40} | {:<20} | {:<16} | {:<12} | {:<10} | {}",
        truncate_label(&r.name, 40),
        truncate_label(&r.neighborhood, 20),
        truncate_label(&r.metro, 16),
        r.country,
        r.kind,
        r.id,
    )
}

pub async fn search(config: &Config, term: String, limit: usize) -> Result<()> {
    let term = term.trim();
    if term.is_empty() {
        anyhow::bail!("Search term cannot be empty");
    }

    let client = OpenTableClient::connect(&config.opentable)
        .await
        .context("Failed to start OpenTable session")?;

    let results = client
        .autocomplete(term)
        .await
        .with_context(|| format!("Search for {term:?} failed"))?;

    if results.is_empty() {
        println!("No matches for \"{term}\", try again.");
        return Ok(());
    }

    println!("Results for \"{term}\":\n");
    for r in results.iter().take(limit) {
        println!("{}", menu_label(r));
    }
    if results.len() > limit {
        println!("\n... {} more, refine the search term", results.len() - limit);
    }
    println!(
        "\nWatch one with: tablewatch watch --restaurant <id> --date <YYYY-MM-DD> \
         --time <HH:MM> --party <n>"
    );

    Ok(())
}
