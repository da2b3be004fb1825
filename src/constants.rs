//! Application constants for Galactiscan
//!
//! This module contains the fixed values of the Hazeron survey formats: the
//! coordinate scale, tech level derivation, envelope layout and the section
//! names the parsers dispatch on.

// =============================================================================
// Coordinates and Resources
// =============================================================================

/// Parsecs per sector-grid cell on each axis
pub const GRID_CELL_PARSECS: f64 = 10.0;

/// Resolved coordinates are rounded to this many steps per parsec
pub const COORDINATE_SCALE: f64 = 1e6;

/// Upper bound on the resource zones a single body may declare
pub const MAX_RESOURCE_ZONES: usize = 16;

/// Quality points per tech level (`tl = quality / 8 + 1`)
pub const TECH_LEVEL_QUALITY_STEP: u32 = 8;

/// Prevalence recorded for biosphere entries, which carry no abundance column
pub const BIOSPHERE_PREVALENCE: u32 = 100;

/// Upper bound of a prevalence percentage
pub const MAX_PREVALENCE: u32 = 100;

/// Marker written in place of quality/abundance when a resource is absent
pub const ABSENT_MARKER: &str = "None";

// =============================================================================
// Text Export
// =============================================================================

/// Timestamp format of the date line opening each text survey
pub const TEXT_DATE_FORMAT: &str = "%m/%d/%y %I:%M %p";

/// Pattern matching the date line opening each text survey
pub const TEXT_DATE_PATTERN: &str = r"^\d+/\d+/\d+\s+\d+:\d+\s+[AP]M";

/// Lines between the date line and the location block
/// (blank, officer, activity, location heading)
pub const TEXT_PREAMBLE_LINES: usize = 4;

/// Lines between the location terminator and the wormhole list
pub const TEXT_WORMHOLE_PREAMBLE_LINES: usize = 3;

// =============================================================================
// Mail Export
// =============================================================================

/// Unidentified bytes before the sender length
pub const MAIL_LEADING_BLOCK_LEN: usize = 18;

/// Unidentified bytes between the sender and the title length
pub const MAIL_SENDER_TRAILER_LEN: usize = 13;

/// Width of the body length field
pub const MAIL_BODY_LENGTH_WIDTH: usize = 4;

/// Title prefix identifying a system survey mail
pub const SURVEY_TITLE_MARKER: &str = "System Survey";

/// Prefix of the hexadecimal scan timestamp line in mail bodies
pub const MAIL_TIMESTAMP_PREFIX: &str = "UTC:";

/// Section title that opens the wormhole list in mail bodies
pub const WORMHOLES_SECTION: &str = "Wormholes";

// =============================================================================
// Starmap Export
// =============================================================================

/// `eod` attribute value of fully surveyed systems
pub const STARMAP_SURVEYED: &str = "Surveyed";

// =============================================================================
// Body Sections
// =============================================================================

/// Section header names shared by the text and mail exports
pub mod sections {
    pub const PRIMARY: &str = "Primary";
    pub const ORBITING: &str = "Orbiting";
    pub const PHOTOSPHERE: &str = "Photosphere";
    pub const GEOSPHERE: &str = "Geosphere";
    pub const HYDROSPHERE: &str = "Hydrosphere";
    pub const ATMOSPHERE: &str = "Atmosphere";
    pub const BIOSPHERE: &str = "Biosphere";
}

// =============================================================================
// Storage
// =============================================================================

/// Application directory name under the user data directory
pub const APP_DIR_NAME: &str = "galactiscan";

/// Default SQLite database file name
pub const DEFAULT_DATABASE_FILE: &str = "galactiscan.sqlite3";

/// Derive the tech level of a resource quality
pub fn tech_level_for_quality(quality: u32) -> u32 {
    quality / TECH_LEVEL_QUALITY_STEP + 1
}

/// Whether a token is the absent-resource marker
pub fn is_absent_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case(ABSENT_MARKER)
}
