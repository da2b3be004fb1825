//! Configuration management and validation.
//!
//! Provides configuration structures for survey parsing policy and the
//! location of the survey database.

use crate::constants::{APP_DIR_NAME, DEFAULT_DATABASE_FILE, SURVEY_TITLE_MARKER};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Handling of resources reported with a prevalence of exactly 0%
///
/// The exports disagree on whether "0%" means a trace amount or nothing at
/// all, so the choice is explicit rather than baked into the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZeroPrevalencePolicy {
    /// Record the resource with prevalence 0
    #[default]
    Keep,
    /// Treat "0%" like the "None" marker and record nothing
    Drop,
}

/// Byte order of the mail container's 4-byte body length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl LengthByteOrder {
    /// Decode a 4-byte length field
    pub fn read_u32(&self, bytes: [u8; 4]) -> u32 {
        match self {
            LengthByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            LengthByteOrder::BigEndian => u32::from_be_bytes(bytes),
        }
    }
}

/// Parser behaviour shared by all survey formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// How "0%" resources are treated
    pub zero_prevalence: ZeroPrevalencePolicy,

    /// Byte order of the mail body length field
    pub mail_length_order: LengthByteOrder,

    /// Mail title prefix that marks a system survey
    pub survey_title_marker: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            zero_prevalence: ZeroPrevalencePolicy::Keep,
            mail_length_order: LengthByteOrder::LittleEndian,
            survey_title_marker: SURVEY_TITLE_MARKER.to_string(),
        }
    }
}

impl ParserConfig {
    /// Set the zero-prevalence policy
    pub fn with_zero_prevalence(mut self, policy: ZeroPrevalencePolicy) -> Self {
        self.zero_prevalence = policy;
        self
    }

    /// Set the mail body length byte order
    pub fn with_mail_length_order(mut self, order: LengthByteOrder) -> Self {
        self.mail_length_order = order;
        self
    }

    /// Whether a resource with this prevalence should be recorded
    pub fn keeps_prevalence(&self, prevalence: u32) -> bool {
        prevalence > 0 || self.zero_prevalence == ZeroPrevalencePolicy::Keep
    }
}

/// Survey database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let database_path = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE));

        Self { database_path }
    }
}

/// Complete Galactiscan configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub parser: ParserConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Use a custom parser configuration
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Use a custom database location
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.database_path = path.into();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.parser.survey_title_marker.trim().is_empty() {
            return Err(Error::configuration(
                "Survey title marker cannot be empty",
            ));
        }

        if self.store.database_path.as_os_str().is_empty() {
            return Err(Error::configuration("Database path cannot be empty"));
        }

        debug!(
            "Configuration valid: zero_prevalence={:?}, database={}",
            self.parser.zero_prevalence,
            self.store.database_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parser.survey_title_marker, "System Survey");
        assert_eq!(config.parser.zero_prevalence, ZeroPrevalencePolicy::Keep);
        assert!(
            config
                .store
                .database_path
                .to_string_lossy()
                .ends_with("galactiscan.sqlite3")
        );
    }

    #[test]
    fn test_empty_title_marker_rejected() {
        let mut config = Config::default();
        config.parser.survey_title_marker = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let config = Config::default().with_database_path("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_prevalence_policy() {
        let keep = ParserConfig::default();
        assert!(keep.keeps_prevalence(0));
        assert!(keep.keeps_prevalence(5));

        let drop = ParserConfig::default().with_zero_prevalence(ZeroPrevalencePolicy::Drop);
        assert!(!drop.keeps_prevalence(0));
        assert!(drop.keeps_prevalence(1));
    }

    #[test]
    fn test_length_byte_order() {
        let bytes = [0x10, 0x00, 0x00, 0x00];
        assert_eq!(LengthByteOrder::LittleEndian.read_u32(bytes), 16);
        assert_eq!(LengthByteOrder::BigEndian.read_u32(bytes), 0x1000_0000);
    }
}
