//! Search command: tabulate stored resources

use super::shared::open_store;
use crate::app::services::survey_store::ResourceHit;
use crate::cli::args::SearchArgs;
use crate::cli::table::Table;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use tracing::debug;

const COLUMNS: [&str; 8] = [
    "Resource", "TL", "Quality", "Prevalence", "Zone", "Body", "System", "Sector",
];

pub fn run_search(args: SearchArgs, config: Config) -> Result<()> {
    let query = args.to_query()?;
    debug!("Searching with {:?}", query);

    let store = open_store(&config)?;
    let hits = store.search(&query)?;

    if args.json {
        let json = serde_json::to_string_pretty(&hits).context("Failed to serialize results")?;
        println!("{}", json);
        return Ok(());
    }

    if hits.is_empty() {
        println!("{}", "No matching resources".bright_yellow());
        return Ok(());
    }

    print!("{}", hits_table(&hits).render());
    println!(
        "{} {}",
        hits.len().to_string().bright_white().bold(),
        "matching resources".bright_cyan()
    );
    Ok(())
}

/// One row per hit; zones are shown 1-based like the game
pub fn hits_table(hits: &[ResourceHit]) -> Table {
    let mut table = Table::new(COLUMNS);
    for hit in hits {
        table.push_row([
            hit.resource.clone(),
            format!("TL{}", hit.tech_level),
            hit.quality.to_string(),
            format!("{}%", hit.prevalence),
            (hit.zone + 1).to_string(),
            hit.body.clone(),
            hit.system.clone(),
            hit.sector.clone(),
        ]);
    }
    table
}
