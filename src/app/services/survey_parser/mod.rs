//! Survey parsers for the Hazeron export formats
//!
//! Three exports describe the same systems:
//! - [`text`] - the plain-text console dump, a line-oriented state machine
//! - [`markup`] - the exported in-game mail, a binary [`envelope`] around an
//!   HTML body driven by `<big>`/`<b>` tags
//! - [`starmap`] - the XML starmap, a typed tree of fully surveyed systems
//!
//! The free-text formats share [`resource_line`], [`location_line`] and the
//! per-section body rules in [`sections`]. Each format parser implements
//! [`SurveyParser`], turning one complete input into the systems it
//! describes, in input order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use galactiscan::app::services::survey_parser::parse_file;
//! use galactiscan::config::ParserConfig;
//!
//! # fn example() -> galactiscan::Result<()> {
//! let systems = parse_file("survey.txt".as_ref(), None, &ParserConfig::default())?;
//! for system in &systems {
//!     println!("{}: {} bodies", system.location.system_name(), system.bodies.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod location_line;
pub mod markup;
pub mod resource_line;
pub mod sections;
pub mod starmap;
pub mod text;

#[cfg(test)]
pub mod tests;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub use markup::MailSurveyParser;
pub use starmap::StarmapParser;
pub use text::TextSurveyParser;

use crate::app::models::System;
use crate::config::ParserConfig;
use crate::{Error, Result};

/// Bytes inspected when sniffing a format
const SNIFF_WINDOW: usize = 512;

/// Leading bytes searched for NULs, which only the mail container has
const BINARY_WINDOW: usize = 32;

/// Supported survey export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyFormat {
    Text,
    MailExport,
    Starmap,
}

impl SurveyFormat {
    /// Guess the format of an input from its content, then its extension
    pub fn sniff(path: &Path, bytes: &[u8]) -> Option<Self> {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_WINDOW)]);
        let head = head.trim_start_matches('\u{FEFF}').trim_start();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        if head.starts_with("<?xml") || head.contains("<starmap") {
            return Some(SurveyFormat::Starmap);
        }
        if extension.as_deref() == Some("xml") {
            return Some(SurveyFormat::Starmap);
        }
        if extension.as_deref() == Some("mail")
            || bytes[..bytes.len().min(BINARY_WINDOW)].contains(&0)
        {
            return Some(SurveyFormat::MailExport);
        }
        let first_line = head.lines().find(|line| !line.trim().is_empty());
        if first_line.is_some_and(text::is_date_line) || extension.as_deref() == Some("txt") {
            return Some(SurveyFormat::Text);
        }
        None
    }
}

impl FromStr for SurveyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(SurveyFormat::Text),
            "mail" => Ok(SurveyFormat::MailExport),
            "starmap" | "xml" => Ok(SurveyFormat::Starmap),
            other => Err(Error::configuration(format!(
                "Unknown survey format '{}': expected text, mail or starmap",
                other
            ))),
        }
    }
}

impl fmt::Display for SurveyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyFormat::Text => write!(f, "text"),
            SurveyFormat::MailExport => write!(f, "mail"),
            SurveyFormat::Starmap => write!(f, "starmap"),
        }
    }
}

/// A parser for one export format
///
/// Each call consumes one complete input and returns every system it
/// describes, or the first fatal error. No state is kept between calls.
pub trait SurveyParser {
    fn format(&self) -> SurveyFormat;

    fn parse(&self, bytes: &[u8]) -> Result<Vec<System>>;
}

/// Parser for a format
pub fn parser_for(format: SurveyFormat, config: &ParserConfig) -> Box<dyn SurveyParser> {
    match format {
        SurveyFormat::Text => Box::new(TextSurveyParser::new(config.clone())),
        SurveyFormat::MailExport => Box::new(MailSurveyParser::new(config.clone())),
        SurveyFormat::Starmap => Box::new(StarmapParser::new(config.clone())),
    }
}

/// Parse a plain-text console export with the default configuration
pub fn parse_text(bytes: &[u8]) -> Result<Vec<System>> {
    TextSurveyParser::default().parse(bytes)
}

/// Parse an exported mail with the default configuration
///
/// A mail that is not a system survey yields no systems.
pub fn parse_mail_export(bytes: &[u8]) -> Result<Vec<System>> {
    MailSurveyParser::default().parse(bytes)
}

/// Parse a starmap export with the default configuration
pub fn parse_starmap(bytes: &[u8]) -> Result<Vec<System>> {
    StarmapParser::default().parse(bytes)
}

/// Read and parse a survey file, sniffing its format unless one is given
pub fn parse_file(
    path: &Path,
    format: Option<SurveyFormat>,
    config: &ParserConfig,
) -> Result<Vec<System>> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::io(format!("Failed to read survey {}", path.display()), e))?;

    let format = match format {
        Some(format) => format,
        None => SurveyFormat::sniff(path, &bytes)
            .ok_or_else(|| Error::unknown_format(path.display().to_string()))?,
    };
    debug!("Parsing {} as {} survey", path.display(), format);

    let systems = parser_for(format, config).parse(&bytes)?;
    info!("Read {} systems from {}", systems.len(), path.display());
    Ok(systems)
}
