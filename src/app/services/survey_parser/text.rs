//! Plain-text console survey parser
//!
//! The console dump is a sequence of surveys, each opened by a date line.
//! Within a survey the location block, the wormhole list and the bodies
//! appear in a fixed order; bodies are separated by blank lines and their
//! section headers are the non-indented lines under the body name.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::location_line::parse_location;
use super::sections::{Section, SectionRules, orbit_description};
use super::{SurveyFormat, SurveyParser};
use crate::app::models::{Polarity, System, SystemBuilder};
use crate::config::ParserConfig;
use crate::constants::{
    TEXT_DATE_FORMAT, TEXT_DATE_PATTERN, TEXT_PREAMBLE_LINES, TEXT_WORMHOLE_PREAMBLE_LINES,
};
use crate::{Error, Result};

static DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TEXT_DATE_PATTERN).expect("date pattern is valid"));

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Whether a line opens a new survey
pub fn is_date_line(line: &str) -> bool {
    DATE_LINE.is_match(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Decode text input, skipping a UTF-8 byte order mark
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}

/// Forward-only line reader that reports 1-based line numbers
#[derive(Debug)]
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            position: 0,
        }
    }

    /// Line number of the most recently returned line
    fn line_number(&self) -> usize {
        self.position
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.position).copied()?;
        self.position += 1;
        Some(line)
    }

    /// Next line, or a fatal error naming what was expected
    fn expect_line(&mut self, expected: &str) -> Result<&'a str> {
        self.next_line()
            .ok_or_else(|| Error::unexpected_eof(self.position + 1, expected))
    }

    fn skip(&mut self, count: usize, expected: &str) -> Result<()> {
        for _ in 0..count {
            self.expect_line(expected)?;
        }
        Ok(())
    }
}

/// Return the two lines immediately preceding the next blank line
///
/// At least two lines are always consumed before looking for the blank, so
/// an optional line ahead of the pair (the "orbiting" line) is discarded.
fn lines_before_blank<'a>(cursor: &mut LineCursor<'a>) -> Result<(&'a str, &'a str)> {
    let mut pending: VecDeque<&'a str> = VecDeque::with_capacity(2);
    pending.push_back(cursor.expect_line("system location line")?);
    pending.push_back(cursor.expect_line("sector location line")?);

    loop {
        let line = cursor.expect_line("blank line after the location")?;
        if is_blank(line) {
            return match (pending.pop_front(), pending.pop_front()) {
                (Some(system), Some(sector)) => Ok((system, sector)),
                _ => Err(Error::malformed_survey(
                    cursor.line_number(),
                    "location block shorter than two lines",
                )),
            };
        }
        pending.pop_front();
        pending.push_back(line);
    }
}

/// What the next non-blank line is expected to be
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseMode {
    /// Before the first date line
    ExpectSystemHeader,
    /// After a blank line: the next line names a body
    ExpectBodyName,
    /// Inside a body, under the given section header if one was seen
    InSection(Option<Section>),
}

/// Explicit state threaded through the line loop
#[derive(Debug)]
struct TextParseState {
    mode: ParseMode,
    current: Option<SystemBuilder>,
    systems: Vec<System>,
}

impl TextParseState {
    fn new() -> Self {
        Self {
            mode: ParseMode::ExpectSystemHeader,
            current: None,
            systems: Vec::new(),
        }
    }

    fn finish_current(&mut self) {
        if let Some(system) = self.current.take().and_then(SystemBuilder::build) {
            debug!(
                "Finished system {} with {} bodies",
                system.location.system_name(),
                system.bodies.len()
            );
            self.systems.push(system);
        }
    }
}

/// Parser for the plain-text console export
#[derive(Debug, Clone, Default)]
pub struct TextSurveyParser {
    config: ParserConfig,
}

impl TextSurveyParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse decoded export text into systems in input order
    pub fn parse_str(&self, content: &str) -> Result<Vec<System>> {
        let rules = SectionRules::new(&self.config);
        let mut cursor = LineCursor::new(content);
        let mut state = TextParseState::new();

        while let Some(line) = cursor.next_line() {
            if is_date_line(line) {
                state.finish_current();
                let line_number = cursor.line_number();
                state.current = Some(self.read_system_header(line, line_number, &mut cursor)?);
                state.mode = ParseMode::ExpectBodyName;
                continue;
            }

            if is_blank(line) {
                if state.mode != ParseMode::ExpectSystemHeader {
                    state.mode = ParseMode::ExpectBodyName;
                }
                continue;
            }

            let Some(builder) = state.current.as_mut() else {
                debug!(
                    "Skipping line {} before the first survey header",
                    cursor.line_number()
                );
                continue;
            };

            if state.mode == ParseMode::ExpectBodyName {
                builder.start_body(line.trim());
                state.mode = ParseMode::InSection(None);
                continue;
            }

            let body = builder.current_body_mut().ok_or_else(|| {
                Error::malformed_survey(cursor.line_number(), "section line outside a body")
            })?;

            if !is_indented(line) {
                let section = Section::from_header(line);
                if let Some(orbits) = orbit_description(line) {
                    body.orbits = Some(orbits);
                }
                state.mode = ParseMode::InSection(Some(section));
                continue;
            }

            match &state.mode {
                ParseMode::InSection(Some(section)) => rules.apply(body, section, line)?,
                _ => debug!(
                    "Ignoring line {} of body '{}' outside any section",
                    cursor.line_number(),
                    body.name
                ),
            }
        }

        state.finish_current();
        info!("Parsed {} systems from text survey", state.systems.len());
        Ok(state.systems)
    }

    /// Read the date line, the location block and the wormhole list
    fn read_system_header(
        &self,
        date_line: &str,
        line_number: usize,
        cursor: &mut LineCursor<'_>,
    ) -> Result<SystemBuilder> {
        let scan_date = parse_scan_date(date_line, line_number)?;
        let mut builder = SystemBuilder::new(Some(scan_date));

        cursor.skip(TEXT_PREAMBLE_LINES, "survey preamble")?;
        let (system_line, sector_line) = lines_before_blank(cursor)?;
        let location = builder.set_location(parse_location(system_line, sector_line)?);
        debug!("Reading survey of {}", location);

        cursor.skip(TEXT_WORMHOLE_PREAMBLE_LINES, "wormhole list heading")?;
        loop {
            let lead = cursor.expect_line("wormhole entry or blank line")?;
            if is_blank(lead) {
                break;
            }

            let polarity_line = cursor.expect_line("wormhole polarity")?;
            let polarity = polarity_line
                .split_whitespace()
                .next()
                .ok_or_else(|| {
                    Error::malformed_survey(cursor.line_number(), "empty wormhole polarity line")
                })?
                .parse::<Polarity>()?;
            let dest_system = cursor.expect_line("wormhole destination system")?;
            let dest_sector = cursor.expect_line("wormhole destination sector")?;
            builder.add_wormhole(polarity, parse_location(dest_system, dest_sector)?)?;
            cursor.expect_line("wormhole charting line")?;
        }

        Ok(builder)
    }
}

fn parse_scan_date(line: &str, line_number: usize) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(line.trim(), TEXT_DATE_FORMAT).map_err(|e| {
        Error::datetime_parsing(format!("Invalid scan date on line {}", line_number), e)
    })?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

impl SurveyParser for TextSurveyParser {
    fn format(&self) -> SurveyFormat {
        SurveyFormat::Text
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<System>> {
        self.parse_str(&decode_text(bytes))
    }
}
