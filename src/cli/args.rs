//! Command-line argument definitions for Galactiscan
//!
//! This module defines the CLI interface using the clap derive API. Global
//! flags (verbosity, database location) apply to every subcommand.

use crate::app::models::Coordinates;
use crate::app::services::survey_parser::SurveyFormat;
use crate::app::services::survey_store::{ResourceQuery, SectorRegion};
use crate::config::{Config, LengthByteOrder, ParserConfig, ZeroPrevalencePolicy};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the Galactiscan survey database
///
/// Loads Shores of Hazeron survey exports into a SQLite database and
/// searches the resources they report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "galactiscan",
    version,
    about = "Load Shores of Hazeron surveys into a database and search their resources",
    long_about = "Reads the three Shores of Hazeron survey exports (the plain-text console dump, \
                  exported survey mail and the XML starmap), keeps the most recent survey of each \
                  system in a SQLite database, and searches resources by name, tech level, body, \
                  system, sector or sector-grid region."
)]
pub struct Args {
    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Survey database file
    ///
    /// Defaults to galactiscan/galactiscan.sqlite3 under the user data directory.
    #[arg(
        long = "db",
        value_name = "PATH",
        global = true,
        help = "Path to the survey database"
    )]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse survey files and save them to the database
    Load(LoadArgs),
    /// Search stored resources
    Search(SearchArgs),
    /// Parse a survey file and print it without saving
    Inspect(InspectArgs),
    /// Delete every stored survey
    Clear(ClearArgs),
}

/// Arguments for the load command
#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Survey files or directories to load
    ///
    /// Directories are walked recursively; every file found is loaded.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Force a survey format instead of detecting it per file
    #[arg(long = "format", value_enum, help = "Survey format of every input")]
    pub format: Option<FormatArg>,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Arguments for the search command
#[derive(Debug, Clone, Default, Parser)]
pub struct SearchArgs {
    /// Resource name substring (case-insensitive)
    #[arg(short = 'n', long = "name", value_name = "TEXT")]
    pub name: Option<String>,

    /// Minimum tech level
    #[arg(short = 't', long = "min-tl", value_name = "TL")]
    pub min_tech_level: Option<u32>,

    /// Body name substring
    #[arg(long = "body", value_name = "TEXT")]
    pub body: Option<String>,

    /// System name substring
    #[arg(long = "system", value_name = "TEXT")]
    pub system: Option<String>,

    /// Sector name substring
    #[arg(long = "sector", value_name = "TEXT")]
    pub sector: Option<String>,

    /// Sector-grid center for a radius search
    #[arg(
        long = "near",
        value_name = "X,Y,Z",
        allow_hyphen_values = true,
        requires = "radius",
        conflicts_with = "bounding_box",
        help = "Sector-grid center of a radius search"
    )]
    pub near: Option<GridPoint>,

    /// Radius in sector-grid cells around --near
    #[arg(long = "radius", value_name = "R", requires = "near")]
    pub radius: Option<f64>,

    /// Sector-grid bounding box
    #[arg(
        long = "box",
        value_name = "X1,Y1,Z1:X2,Y2,Z2",
        allow_hyphen_values = true,
        help = "Sector-grid bounding box given by two corners"
    )]
    pub bounding_box: Option<GridBox>,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Survey file to parse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Force the survey format instead of detecting it
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Print the parsed systems as JSON
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Arguments for the clear command
#[derive(Debug, Clone, Default, Parser)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

/// Parser policy flags shared by load and inspect
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ParserArgs {
    /// How resources reported at 0% are treated
    #[arg(long = "zero-prevalence", value_enum, default_value = "keep")]
    pub zero_prevalence: ZeroPrevalenceArg,

    /// Byte order of the mail body length field
    #[arg(long = "mail-length-order", value_enum, default_value = "little")]
    pub mail_length_order: ByteOrderArg,
}

/// Survey format names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Plain-text console dump
    Text,
    /// Exported survey mail
    Mail,
    /// XML starmap
    Starmap,
}

impl From<FormatArg> for SurveyFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => SurveyFormat::Text,
            FormatArg::Mail => SurveyFormat::MailExport,
            FormatArg::Starmap => SurveyFormat::Starmap,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ZeroPrevalenceArg {
    /// Record 0% resources
    #[default]
    Keep,
    /// Skip 0% resources
    Drop,
}

impl From<ZeroPrevalenceArg> for ZeroPrevalencePolicy {
    fn from(arg: ZeroPrevalenceArg) -> Self {
        match arg {
            ZeroPrevalenceArg::Keep => ZeroPrevalencePolicy::Keep,
            ZeroPrevalenceArg::Drop => ZeroPrevalencePolicy::Drop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ByteOrderArg {
    #[default]
    Little,
    Big,
}

impl From<ByteOrderArg> for LengthByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Little => LengthByteOrder::LittleEndian,
            ByteOrderArg::Big => LengthByteOrder::BigEndian,
        }
    }
}

/// Sector-grid point written as `X,Y,Z`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint(pub Coordinates);

impl FromStr for GridPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(Error::configuration(format!(
                "Grid point '{}' must be written as X,Y,Z",
                s
            )));
        }

        let mut values = [0.0; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse::<f64>().map_err(|_| {
                Error::configuration(format!("Invalid grid coordinate '{}' in '{}'", part, s))
            })?;
        }
        Ok(GridPoint(Coordinates::new(values[0], values[1], values[2])))
    }
}

/// Sector-grid box written as `X1,Y1,Z1:X2,Y2,Z2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBox {
    pub first: Coordinates,
    pub second: Coordinates,
}

impl FromStr for GridBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (first, second) = s.split_once(':').ok_or_else(|| {
            Error::configuration(format!(
                "Bounding box '{}' must be written as X1,Y1,Z1:X2,Y2,Z2",
                s
            ))
        })?;

        Ok(GridBox {
            first: first.parse::<GridPoint>()?.0,
            second: second.parse::<GridPoint>()?.0,
        })
    }
}

impl Args {
    /// Map the verbosity count onto a tracing level
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Default configuration with command-line overrides applied
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::default();
        if let Some(database) = &self.database {
            config = config.with_database_path(database.clone());
        }
        if let Some(parser) = self.command.as_ref().and_then(Commands::parser_args) {
            config = config.with_parser(parser.parser_config());
        }
        config.validate()?;
        Ok(config)
    }
}

impl Commands {
    /// Parser flags of the subcommands that parse survey files
    pub fn parser_args(&self) -> Option<&ParserArgs> {
        match self {
            Commands::Load(args) => Some(&args.parser),
            Commands::Inspect(args) => Some(&args.parser),
            Commands::Search(_) | Commands::Clear(_) => None,
        }
    }
}

impl ParserArgs {
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_zero_prevalence(self.zero_prevalence.into())
            .with_mail_length_order(self.mail_length_order.into())
    }
}

impl SearchArgs {
    /// Build the store query described by these arguments
    pub fn to_query(&self) -> Result<ResourceQuery> {
        let mut query = ResourceQuery::new();

        if let Some(name) = &self.name {
            query = query.with_name(name.clone());
        }
        if let Some(tech_level) = self.min_tech_level {
            query = query.with_min_tech_level(tech_level);
        }
        if let Some(body) = &self.body {
            query = query.with_body(body.clone());
        }
        if let Some(system) = &self.system {
            query = query.with_system(system.clone());
        }
        if let Some(sector) = &self.sector {
            query = query.with_sector(sector.clone());
        }

        match (self.near, self.radius, self.bounding_box) {
            (Some(_), Some(_), Some(_)) => {
                return Err(Error::configuration(
                    "--near and --box cannot be combined",
                ));
            }
            (Some(GridPoint(center)), Some(radius), None) => {
                query = query.with_region(SectorRegion::radius(center, radius));
            }
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(Error::configuration(
                    "--near and --radius must be given together",
                ));
            }
            (None, None, Some(grid_box)) => {
                query = query.with_region(SectorRegion::bounding_box(
                    grid_box.first,
                    grid_box.second,
                ));
            }
            (None, None, None) => {}
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_point_parsing() {
        let point = GridPoint::from_str("4, 5,-6").unwrap();
        assert_eq!(point.0, Coordinates::new(4.0, 5.0, -6.0));

        assert!(GridPoint::from_str("4,5").is_err());
        assert!(GridPoint::from_str("4,five,6").is_err());
        assert!(GridPoint::from_str("").is_err());
    }

    #[test]
    fn test_grid_box_parsing() {
        let grid_box = GridBox::from_str("0,0,0:10,-2,3.5").unwrap();
        assert_eq!(grid_box.first, Coordinates::new(0.0, 0.0, 0.0));
        assert_eq!(grid_box.second, Coordinates::new(10.0, -2.0, 3.5));

        assert!(GridBox::from_str("0,0,0").is_err());
        assert!(GridBox::from_str("0,0,0:1,1").is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        let mut args = Args::parse_from(["galactiscan", "clear", "--yes"]);
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");
        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");
        args.verbose = 5;
        assert_eq!(args.get_log_level(), "trace");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "galactiscan",
            "search",
            "--name",
            "ore",
            "-vv",
            "--db",
            "x.db",
        ]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.database, Some(PathBuf::from("x.db")));
        assert_eq!(args.config().unwrap().store.database_path, PathBuf::from("x.db"));
    }

    #[test]
    fn test_load_args() {
        let args = Args::parse_from([
            "galactiscan",
            "load",
            "--format",
            "mail",
            "--zero-prevalence",
            "drop",
            "a.mail",
            "surveys/",
        ]);
        let Some(Commands::Load(load)) = args.command else {
            panic!("expected load command");
        };

        assert_eq!(load.paths.len(), 2);
        assert_eq!(load.format.map(SurveyFormat::from), Some(SurveyFormat::MailExport));
        let config = load.parser.parser_config();
        assert_eq!(config.zero_prevalence, ZeroPrevalencePolicy::Drop);
        assert_eq!(config.mail_length_order, LengthByteOrder::LittleEndian);
    }

    #[test]
    fn test_parser_flags_reach_config() {
        let args = Args::parse_from([
            "galactiscan",
            "inspect",
            "--zero-prevalence",
            "drop",
            "--mail-length-order",
            "big",
            "survey.mail",
        ]);
        let config = args.config().unwrap();

        assert_eq!(config.parser.zero_prevalence, ZeroPrevalencePolicy::Drop);
        assert_eq!(config.parser.mail_length_order, LengthByteOrder::BigEndian);
        assert_eq!(config.parser.survey_title_marker, "System Survey");

        let search = Args::parse_from(["galactiscan", "search", "-n", "ore"]);
        assert_eq!(search.config().unwrap().parser, ParserConfig::default());
    }

    #[test]
    fn test_load_requires_paths() {
        assert!(Args::try_parse_from(["galactiscan", "load"]).is_err());
    }

    #[test]
    fn test_search_query_from_args() {
        let args = SearchArgs {
            name: Some("ore".to_string()),
            min_tech_level: Some(6),
            near: Some(GridPoint(Coordinates::new(4.0, 5.0, -6.0))),
            radius: Some(2.5),
            ..Default::default()
        };
        let query = args.to_query().unwrap();

        assert_eq!(query.name.as_deref(), Some("ore"));
        assert_eq!(query.min_tech_level, Some(6));
        assert_eq!(
            query.region,
            Some(SectorRegion::radius(Coordinates::new(4.0, 5.0, -6.0), 2.5))
        );
    }

    #[test]
    fn test_search_radius_needs_center() {
        let args = SearchArgs {
            radius: Some(2.0),
            ..Default::default()
        };
        assert!(matches!(args.to_query(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_search_region_flags_conflict() {
        let result = Args::try_parse_from([
            "galactiscan",
            "search",
            "--near",
            "0,0,0",
            "--radius",
            "1",
            "--box",
            "0,0,0:1,1,1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_box_normalizes_corners() {
        let args = Args::parse_from(["galactiscan", "search", "--box", "5,0,0:-5,2,1"]);
        let Some(Commands::Search(search)) = args.command else {
            panic!("expected search command");
        };
        assert_eq!(
            search.to_query().unwrap().region,
            Some(SectorRegion::BoundingBox {
                min: Coordinates::new(-5.0, 0.0, 0.0),
                max: Coordinates::new(5.0, 2.0, 1.0),
            })
        );
    }
}
