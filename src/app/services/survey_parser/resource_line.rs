//! Resource fragment tokenization shared by every survey format
//!
//! A resource occurrence reads `<name> Q<quality> <prevalence>%` or
//! `<name> None`. Zoned rows repeat the quality/prevalence pair once per
//! zone, separated by `", "`, with the name only in the first fragment.
//! Resource names may themselves contain spaces, so the name boundary is
//! found heuristically.

use crate::constants::{MAX_PREVALENCE, is_absent_marker};
use crate::{Error, Result};

/// Delimiter introducing the quality token
const QUALITY_DELIMITER: &str = " Q";

/// Delimiter introducing the absent marker
const ABSENT_DELIMITER: &str = " None";

/// Abundance read from one resource fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abundance {
    /// The fragment ends with the "None" marker
    Absent,
    Present { quality: u32, prevalence: u32 },
}

/// Raw tokens of a single resource occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTokens<'a> {
    pub name: &'a str,
    pub quality: &'a str,
    pub prevalence: &'a str,
}

/// Extract the resource name from a resource line
///
/// Two candidate names are cut, one before the first `" Q"` and one before
/// the first `" None"`; the shorter candidate is the name. A name that
/// itself contains one of the delimiters is therefore cut early, and stored
/// data depends on that exact boundary.
pub fn resource_name(line: &str) -> Result<&str> {
    let line = line.trim();
    if !line.contains(QUALITY_DELIMITER) && !line.contains(ABSENT_DELIMITER) {
        return Err(Error::unrecognized_resource(
            line,
            "no quality token or None marker",
        ));
    }

    let by_quality = split_before(line, QUALITY_DELIMITER);
    let by_absent = split_before(line, ABSENT_DELIMITER);
    let name = if by_quality.len() < by_absent.len() {
        by_quality
    } else {
        by_absent
    };

    if name.is_empty() {
        return Err(Error::unrecognized_resource(line, "empty resource name"));
    }
    Ok(name)
}

fn split_before<'a>(line: &'a str, delimiter: &str) -> &'a str {
    line.split(delimiter).next().unwrap_or(line).trim()
}

/// Split a single resource line into name, quality and prevalence tokens
///
/// Returns `None` for a `<name> None` row.
pub fn tokenize(line: &str) -> Result<Option<ResourceTokens<'_>>> {
    let name = resource_name(line)?;
    let words: Vec<&str> = line.split_whitespace().collect();

    match words[..] {
        [.., last] if is_absent_marker(last) => Ok(None),
        [.., quality, prevalence] => Ok(Some(ResourceTokens {
            name,
            quality,
            prevalence,
        })),
        _ => Err(Error::unrecognized_resource(
            line.trim(),
            "expected quality and prevalence tokens",
        )),
    }
}

/// Parse a single (global) resource line into name and abundance
pub fn parse_resource_line(line: &str) -> Result<(&str, Abundance)> {
    match tokenize(line)? {
        None => Ok((resource_name(line)?, Abundance::Absent)),
        Some(tokens) => Ok((
            tokens.name,
            Abundance::Present {
                quality: parse_quality(tokens.quality)?,
                prevalence: parse_prevalence(tokens.prevalence)?,
            },
        )),
    }
}

/// Read the trailing quality/prevalence pair of one zone fragment
pub fn parse_zone_fragment(fragment: &str) -> Result<Abundance> {
    let words: Vec<&str> = fragment.split_whitespace().collect();

    match words[..] {
        [] => Err(Error::unrecognized_resource(fragment, "empty zone fragment")),
        [.., last] if is_absent_marker(last) => Ok(Abundance::Absent),
        [.., quality, prevalence] => Ok(Abundance::Present {
            quality: parse_quality(quality)?,
            prevalence: parse_prevalence(prevalence)?,
        }),
        [_] => Err(Error::unrecognized_resource(
            fragment.trim(),
            "zone fragment lacks a quality token",
        )),
    }
}

/// Read the trailing quality of a zone fragment that carries no abundance
///
/// Returns `None` for the absent marker.
pub fn parse_quality_fragment(fragment: &str) -> Result<Option<u32>> {
    match fragment.split_whitespace().last() {
        None => Err(Error::unrecognized_resource(fragment, "empty zone fragment")),
        Some(last) if is_absent_marker(last) => Ok(None),
        Some(last) => parse_quality(last).map(Some),
    }
}

/// Parse a quality token, with or without its `Q` prefix
pub fn parse_quality(token: &str) -> Result<u32> {
    let digits = token.trim().trim_matches('Q');
    digits.parse::<u32>().map_err(|e| {
        Error::unrecognized_resource(token, format!("invalid quality: {}", e))
    })
}

/// Parse a prevalence token, with or without its `%` suffix
pub fn parse_prevalence(token: &str) -> Result<u32> {
    let digits = token.trim().trim_matches('%');
    let prevalence = digits.parse::<u32>().map_err(|e| {
        Error::unrecognized_resource(token, format!("invalid prevalence: {}", e))
    })?;

    if prevalence > MAX_PREVALENCE {
        return Err(Error::unrecognized_resource(
            token,
            format!("prevalence above {}%", MAX_PREVALENCE),
        ));
    }
    Ok(prevalence)
}
