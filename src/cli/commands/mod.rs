//! Command implementations for the Galactiscan CLI
//!
//! Each subcommand lives in its own module:
//! - `load`: parse survey files and save them to the database
//! - `search`: tabulate stored resources
//! - `inspect`: parse one file and print it without saving
//! - `clear`: drop every stored survey

pub mod clear;
pub mod inspect;
pub mod load;
pub mod search;
pub mod shared;

pub use load::LoadStats;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Dispatch to the subcommand handler
///
/// Does nothing when no subcommand was given; the binary shows help instead.
pub fn run(args: Args) -> Result<()> {
    let config = args.config()?;

    match args.command {
        Some(Commands::Load(load_args)) => load::run_load(load_args, config).map(|_| ()),
        Some(Commands::Search(search_args)) => search::run_search(search_args, config),
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args, config),
        Some(Commands::Clear(clear_args)) => clear::run_clear(clear_args, config),
        None => Ok(()),
    }
}
