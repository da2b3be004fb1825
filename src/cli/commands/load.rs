//! Load command: parse survey files into the database

use super::shared::{create_progress_bar, open_store};
use crate::app::services::survey_parser::{SurveyFormat, parse_file};
use crate::app::services::survey_store::{SaveOutcome, SurveySink};
use crate::cli::args::LoadArgs;
use crate::cli::input::discover_survey_files;
use crate::config::{Config, ParserConfig};
use anyhow::Result;
use colored::*;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters reported after a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_read: usize,
    pub files_failed: usize,
    /// Files that parsed but described no system, e.g. non-survey mail
    pub files_empty: usize,
    pub systems_inserted: usize,
    pub systems_replaced: usize,
    pub systems_stale: usize,
}

impl LoadStats {
    pub fn systems_saved(&self) -> usize {
        self.systems_inserted + self.systems_replaced
    }

    fn record(&mut self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Inserted => self.systems_inserted += 1,
            SaveOutcome::Replaced => self.systems_replaced += 1,
            SaveOutcome::Stale => self.systems_stale += 1,
        }
    }
}

/// Run the load command
pub fn run_load(args: LoadArgs, config: Config) -> Result<LoadStats> {
    let start = Instant::now();
    let files = discover_survey_files(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No survey files found");
    }

    let format = args.format.map(SurveyFormat::from);
    let mut store = open_store(&config)?;

    println!(
        "{} {} survey files into {}",
        "Loading".bright_green().bold(),
        files.len().to_string().bright_white().bold(),
        config.store.database_path.display()
    );

    let pb = create_progress_bar(files.len() as u64, "Loading surveys");
    let stats = load_files(&mut store, &files, format, &config.parser, &pb)?;
    pb.finish_and_clear();

    print_summary(&stats, start.elapsed());
    Ok(stats)
}

/// Parse every file and save its systems to `sink`
///
/// A file that fails to parse is reported and skipped. A storage failure
/// aborts the load.
pub fn load_files(
    sink: &mut impl SurveySink,
    files: &[PathBuf],
    format: Option<SurveyFormat>,
    config: &ParserConfig,
    pb: &ProgressBar,
) -> Result<LoadStats> {
    let mut stats = LoadStats::default();

    for path in files {
        pb.set_message(file_label(path));
        match parse_file(path, format, config) {
            Ok(systems) => {
                stats.files_read += 1;
                if systems.is_empty() {
                    stats.files_empty += 1;
                }
                for system in &systems {
                    stats.record(sink.save(system)?);
                }
            }
            Err(error) => {
                stats.files_failed += 1;
                let reason = if error.is_parse_error() {
                    "malformed survey"
                } else {
                    "unreadable input"
                };
                pb.suspend(|| warn!("Skipping {} ({}): {}", path.display(), reason, error));
            }
        }
        pb.inc(1);
    }

    info!(
        "Loaded {} files: {} systems saved, {} stale, {} files failed",
        stats.files_read,
        stats.systems_saved(),
        stats.systems_stale,
        stats.files_failed
    );
    Ok(stats)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_summary(stats: &LoadStats, elapsed: Duration) {
    println!("\n{}", "Load Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        format!("{:.2}s", elapsed.as_secs_f64()).bright_white()
    );
    println!(
        "  {} {}",
        "Files read:".bright_cyan(),
        stats.files_read.to_string().bright_white()
    );
    if stats.files_empty > 0 {
        println!(
            "  {} {}",
            "Files without surveys:".bright_yellow(),
            stats.files_empty.to_string().bright_yellow()
        );
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} ({} new, {} replaced)",
        "Systems saved:".bright_cyan(),
        stats.systems_saved().to_string().bright_white().bold(),
        stats.systems_inserted,
        stats.systems_replaced
    );
    if stats.systems_stale > 0 {
        println!(
            "  {} {}",
            "Older surveys skipped:".bright_cyan(),
            stats.systems_stale.to_string().bright_white()
        );
    }
}
