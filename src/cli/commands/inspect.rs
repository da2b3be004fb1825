//! Inspect command: parse one file and print it without saving

use crate::app::models::System;
use crate::app::services::survey_parser::{SurveyFormat, parse_file};
use crate::cli::args::InspectArgs;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;

pub fn run_inspect(args: InspectArgs, config: Config) -> Result<()> {
    let format = args.format.map(SurveyFormat::from);
    let systems = parse_file(&args.file, format, &config.parser)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&systems).context("Failed to serialize systems")?;
        println!("{}", json);
    } else {
        print!("{}", render_systems(&systems));
        println!(
            "{} {}",
            systems.len().to_string().bright_white().bold(),
            "systems parsed".bright_cyan()
        );
    }
    Ok(())
}

/// Diagnostic rendering, systems separated by blank lines
pub fn render_systems(systems: &[System]) -> String {
    systems
        .iter()
        .map(|system| format!("{}\n\n", system))
        .collect()
}
