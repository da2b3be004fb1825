//! Galactiscan Library
//!
//! A Rust library for turning Shores of Hazeron survey exports into a uniform
//! model of star systems, bodies, zones and harvestable resources.
//!
//! This library provides tools for:
//! - Parsing the plain-text console survey dump
//! - Unwrapping the binary mail container and parsing its HTML survey body
//! - Walking the XML starmap export for fully surveyed systems
//! - Resolving system-local and sector-grid coordinates into universal space
//! - Persisting surveys in SQLite and searching resources across them

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod location_resolver;
        pub mod survey_parser;
        pub mod survey_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
    pub mod table;
}

// Re-export commonly used types
pub use app::models::{
    Body, BodyKind, Coordinates, Location, Polarity, Resource, System, Wormhole, Zone,
};
pub use app::services::survey_parser::{
    SurveyFormat, SurveyParser, parse_mail_export, parse_starmap, parse_text,
};
pub use app::services::survey_store::{SaveOutcome, SurveySink, SurveyStore};
pub use config::Config;

/// Result type alias for Galactiscan
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for survey parsing and persistence
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Text lookahead ran past the end of the input
    #[error("Unexpected end of survey at line {line}: expected {expected}")]
    UnexpectedEof { line: usize, expected: String },

    /// Structural problem in a text or markup survey
    #[error("Malformed survey at line {line}: {message}")]
    MalformedSurvey { line: usize, message: String },

    /// Mail container could not be unwrapped
    #[error("Mail envelope error at byte {offset}: {message}")]
    Envelope { offset: usize, message: String },

    /// Resource fragment in an unknown shape
    #[error("Unrecognized resource '{fragment}': {message}")]
    UnrecognizedResource { fragment: String, message: String },

    /// Coordinate text could not be read
    #[error("Invalid coordinates: '{text}'")]
    InvalidCoordinates { text: String },

    /// Starmap XML could not be parsed
    #[error("XML error: {message}")]
    Xml {
        message: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Starmap tree is missing or has invalid attributes
    #[error("Starmap error: {message}")]
    Starmap { message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Database operation failed
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input format could not be determined
    #[error("Unknown survey format: {path}")]
    UnknownFormat { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an end-of-input error
    pub fn unexpected_eof(line: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            line,
            expected: expected.into(),
        }
    }

    /// Create a malformed survey error
    pub fn malformed_survey(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedSurvey {
            line,
            message: message.into(),
        }
    }

    /// Create a mail envelope error
    pub fn envelope(offset: usize, message: impl Into<String>) -> Self {
        Self::Envelope {
            offset,
            message: message.into(),
        }
    }

    /// Create an unrecognized resource error
    pub fn unrecognized_resource(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnrecognizedResource {
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Create an invalid coordinates error
    pub fn invalid_coordinates(text: impl Into<String>) -> Self {
        Self::InvalidCoordinates { text: text.into() }
    }

    /// Create a starmap structure error
    pub fn starmap(message: impl Into<String>) -> Self {
        Self::Starmap {
            message: message.into(),
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown format error
    pub fn unknown_format(path: impl Into<String>) -> Self {
        Self::UnknownFormat { path: path.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Whether this error was raised by one of the survey parsers
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. }
                | Self::MalformedSurvey { .. }
                | Self::Envelope { .. }
                | Self::UnrecognizedResource { .. }
                | Self::InvalidCoordinates { .. }
                | Self::Xml { .. }
                | Self::Starmap { .. }
                | Self::DateTimeParsing { .. }
                | Self::DataValidation { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage {
            message: "Database operation failed".to_string(),
            source: error,
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(error: roxmltree::Error) -> Self {
        Self::Xml {
            message: "Starmap XML parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}
