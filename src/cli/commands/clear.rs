//! Clear command: drop every stored survey

use super::shared::open_store;
use crate::cli::args::ClearArgs;
use crate::cli::input::prompt_confirmation;
use crate::config::Config;
use anyhow::Result;
use colored::*;

pub fn run_clear(args: ClearArgs, config: Config) -> Result<()> {
    let mut store = open_store(&config)?;
    let stored = store.survey_count()?;

    if !args.yes {
        let message = format!(
            "Delete all {} surveys from {}?",
            stored,
            config.store.database_path.display()
        );
        if !prompt_confirmation(&message, false)? {
            println!("{}", "Nothing deleted".bright_yellow());
            return Ok(());
        }
    }

    store.clear()?;
    println!(
        "{} {} surveys",
        "Deleted".bright_green().bold(),
        stored.to_string().bright_white().bold()
    );
    Ok(())
}
