//! Name-and-coordinate lines of the text and mail exports
//!
//! Systems and sectors are written as `Name (x, y, z)`. The mail export adds
//! a trailing "System" to system names; sector names end in "Sector". Both
//! words are dropped so the two formats produce identical names.

use regex::Regex;
use std::sync::LazyLock;

use crate::app::models::{Coordinates, Location};
use crate::{Error, Result};

/// Permissive match for a parenthesized coordinate group anywhere on a line
static COORDINATE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9,. \-]+\)").expect("coordinate pattern is valid"));

/// Coordinate group closing the line
static TRAILING_COORDINATE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9,. \-]+\)\s*$").expect("coordinate pattern is valid"));

const SYSTEM_SUFFIX: &str = "System";
const SECTOR_SUFFIX: &str = "Sector";

/// Whether a line contains a parenthesized coordinate group
pub fn has_coordinates(line: &str) -> bool {
    COORDINATE_GROUP.is_match(line)
}

/// Whether a line ends with a parenthesized coordinate group
pub fn ends_with_coordinates(line: &str) -> bool {
    TRAILING_COORDINATE_GROUP.is_match(line)
}

/// Parse the coordinates inside the last parentheses of a line
pub fn parse_coordinates(line: &str) -> Result<Coordinates> {
    let open = line
        .rfind('(')
        .ok_or_else(|| Error::invalid_coordinates(line.trim()))?;
    let inner = &line[open + 1..];
    let inner = match inner.rfind(')') {
        Some(close) => &inner[..close],
        None => inner,
    };

    let values = inner
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| Error::invalid_coordinates(line.trim()))?;

    match values[..] {
        [x, y, z] => Ok(Coordinates::new(x, y, z)),
        _ => Err(Error::invalid_coordinates(line.trim())),
    }
}

/// Name portion of a location line, before the coordinates
fn raw_name(line: &str) -> &str {
    match line.rfind('(') {
        Some(open) => line[..open].trim(),
        None => line.trim(),
    }
}

/// Drop a trailing word unless nothing would remain
fn strip_trailing_word(name: &str, word: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > 1 && words.last() == Some(&word) {
        words.pop();
    }
    words.join(" ")
}

/// System name of a location line
pub fn system_name(line: &str) -> String {
    strip_trailing_word(raw_name(line), SYSTEM_SUFFIX)
}

/// Sector name of a location line
pub fn sector_name(line: &str) -> String {
    strip_trailing_word(raw_name(line), SECTOR_SUFFIX)
}

/// Build a location from a system line and the sector line that follows it
pub fn parse_location(system_line: &str, sector_line: &str) -> Result<Location> {
    let system_coords = parse_coordinates(system_line)?;
    let sector_coords = parse_coordinates(sector_line)?;

    Ok(Location::new(
        system_name(system_line),
        sector_name(sector_line),
        system_coords,
        sector_coords,
    ))
}
