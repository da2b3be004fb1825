//! HTML survey body of the mail export
//!
//! The body carries the same survey as the text export, but structure is
//! signalled by tags: `<big>` text opens the wormhole list or a new body and
//! `<b>` text is a header (a wormhole entry or a body section). Everything
//! else is content, interpreted by the same section rules as the text
//! export.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::envelope::MailEnvelope;
use super::location_line::{ends_with_coordinates, has_coordinates, parse_location};
use super::sections::{Section, SectionRules, orbit_description};
use super::{SurveyFormat, SurveyParser};
use crate::app::models::{Polarity, System, SystemBuilder};
use crate::config::ParserConfig;
use crate::constants::{MAIL_TIMESTAMP_PREFIX, WORMHOLES_SECTION};
use crate::{Error, Result};

static TIMESTAMP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UTC:[0-9a-fA-F]+$").expect("timestamp pattern is valid"));

static POLARITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Positive|Negative) Wormhole$").expect("polarity pattern is valid")
});

// =============================================================================
// Tokenizer
// =============================================================================

/// One event of the tag scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Opening or self-closing tag, lowercased
    Start(String),
    /// Closing tag, lowercased
    End(String),
    /// Trimmed, entity-decoded, non-empty text line
    Text(String),
}

/// Tags whose content is never survey text
const RAW_TEXT_TAGS: [&str; 2] = ["style", "script"];

/// Scan markup into tag and text events
///
/// Comments, declarations and processing instructions are skipped. Text runs
/// are split on newlines so each physical line becomes its own event.
pub fn tokenize(markup: &str) -> Vec<MarkupEvent> {
    let mut events = Vec::new();
    let mut rest = markup;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            push_text(&mut events, rest);
            break;
        };
        push_text(&mut events, &rest[..open]);
        rest = &rest[open..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(close) = rest.find('>') else {
            push_text(&mut events, rest);
            break;
        };
        let inner = &rest[1..close];
        rest = &rest[close + 1..];

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }

        if let Some(name) = inner.strip_prefix('/') {
            events.push(MarkupEvent::End(tag_name(name)));
            continue;
        }

        let name = tag_name(inner);
        if RAW_TEXT_TAGS.contains(&name.as_str()) {
            let closing = format!("</{}", name);
            rest = match find_ci(rest, &closing) {
                Some(start) => match rest[start..].find('>') {
                    Some(end) => &rest[start + end + 1..],
                    None => "",
                },
                None => "",
            };
            continue;
        }
        events.push(MarkupEvent::Start(name));
    }

    events
}

fn tag_name(inner: &str) -> String {
    inner
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}

fn push_text(events: &mut Vec<MarkupEvent>, raw: &str) {
    let decoded = decode_entities(raw);
    for line in decoded.split('\n') {
        let line = line.trim();
        if !line.is_empty() {
            events.push(MarkupEvent::Text(line.to_string()));
        }
    }
}

/// Decode named and numeric character references
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{A0}'),
        "deg" => Some('°'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// =============================================================================
// Survey body state machine
// =============================================================================

/// Part of the survey the scanner is in
#[derive(Debug, Clone, PartialEq, Eq)]
enum MarkupSection {
    /// Timestamp, officer text and the location lines
    Init,
    Wormholes,
    /// Inside a body, under the given section header if one was seen
    Body(Option<Section>),
}

/// Wormhole entry collected from its header and content lines
#[derive(Debug, Default)]
struct PendingWormhole {
    polarity: Option<Polarity>,
    system_line: Option<String>,
    sector_line: Option<String>,
}

/// Explicit state threaded through the event loop
#[derive(Debug)]
struct MarkupState {
    section: MarkupSection,
    big_depth: usize,
    bold_depth: usize,
    line: usize,
    scan_date: Option<DateTime<Utc>>,
    location_lines: VecDeque<String>,
    builder: Option<SystemBuilder>,
    pending: Option<PendingWormhole>,
}

impl MarkupState {
    fn new() -> Self {
        Self {
            section: MarkupSection::Init,
            big_depth: 0,
            bold_depth: 0,
            line: 1,
            scan_date: None,
            location_lines: VecDeque::with_capacity(2),
            builder: None,
            pending: None,
        }
    }

    /// Build the system location from the buffered coordinate lines
    fn open_system(&mut self) -> Result<&mut SystemBuilder> {
        if self.builder.is_none() {
            let (system_line, sector_line) =
                match (self.location_lines.pop_front(), self.location_lines.pop_front()) {
                    (Some(system), Some(sector)) if ends_with_coordinates(&sector) => {
                        (system, sector)
                    }
                    _ => {
                        return Err(Error::malformed_survey(
                            self.line,
                            "survey body has no system and sector location lines",
                        ));
                    }
                };

            if self.scan_date.is_none() {
                debug!("Mail survey without a UTC timestamp line");
            }
            let mut builder = SystemBuilder::new(self.scan_date);
            let location = builder.set_location(parse_location(&system_line, &sector_line)?);
            debug!("Reading survey of {}", location);
            self.builder = Some(builder);
        }

        self.builder.as_mut().ok_or_else(|| {
            Error::malformed_survey(self.line, "system location was not established")
        })
    }

    /// Complete the wormhole entry in progress, if any
    fn flush_wormhole(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let line = self.line;
        let builder = self.open_system()?;

        match pending {
            PendingWormhole {
                polarity: Some(polarity),
                system_line: Some(system_line),
                sector_line: Some(sector_line),
            } => builder.add_wormhole(polarity, parse_location(&system_line, &sector_line)?),
            _ => Err(Error::malformed_survey(
                line,
                "wormhole entry lacks a polarity or destination",
            )),
        }
    }

    fn handle_section_title(&mut self, title: &str) -> Result<()> {
        self.flush_wormhole()?;
        let builder = self.open_system()?;

        if title == WORMHOLES_SECTION {
            self.section = MarkupSection::Wormholes;
        } else {
            builder.start_body(title);
            self.section = MarkupSection::Body(None);
        }
        Ok(())
    }

    fn handle_header(&mut self, header: &str) -> Result<()> {
        match self.section {
            MarkupSection::Init => debug!("Ignoring header '{}' before the first section", header),
            MarkupSection::Wormholes => {
                self.flush_wormhole()?;
                self.pending = Some(PendingWormhole::default());
            }
            MarkupSection::Body(_) => {
                if let Some(body) = self
                    .builder
                    .as_mut()
                    .and_then(SystemBuilder::current_body_mut)
                {
                    if let Some(orbits) = orbit_description(header) {
                        body.orbits = Some(orbits);
                    }
                }
                self.section = MarkupSection::Body(Some(Section::from_header(header)));
            }
        }
        Ok(())
    }

    fn handle_content(&mut self, text: &str, rules: &SectionRules<'_>) -> Result<()> {
        match &self.section {
            MarkupSection::Init => {
                if TIMESTAMP_LINE.is_match(text) {
                    self.scan_date = Some(parse_timestamp(text, self.line)?);
                } else if has_coordinates(text) {
                    if self.location_lines.len() == 2 {
                        self.location_lines.pop_front();
                    }
                    self.location_lines.push_back(text.to_string());
                }
            }
            MarkupSection::Wormholes => {
                let Some(pending) = self.pending.as_mut() else {
                    debug!("Ignoring wormhole text '{}' outside an entry", text);
                    return Ok(());
                };
                if POLARITY_LINE.is_match(text) {
                    let word = text.split_whitespace().next().unwrap_or_default();
                    pending.polarity = Some(word.parse()?);
                } else if ends_with_coordinates(text) && pending.system_line.is_none() {
                    pending.system_line = Some(text.to_string());
                } else if ends_with_coordinates(text) && pending.sector_line.is_none() {
                    pending.sector_line = Some(text.to_string());
                }
            }
            MarkupSection::Body(section) => {
                let body = self
                    .builder
                    .as_mut()
                    .and_then(SystemBuilder::current_body_mut)
                    .ok_or_else(|| Error::malformed_survey(self.line, "body text outside a body"))?;
                match section {
                    Some(section) => rules.apply(body, section, text)?,
                    None => debug!("Ignoring '{}' before the first section of {}", text, body.name),
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<System> {
        self.flush_wormhole()?;
        let line = self.line;
        self.open_system()?;
        self.builder
            .and_then(SystemBuilder::build)
            .ok_or_else(|| Error::malformed_survey(line, "survey has no system location"))
    }
}

fn parse_timestamp(text: &str, line: usize) -> Result<DateTime<Utc>> {
    let hex = text.trim_start_matches(MAIL_TIMESTAMP_PREFIX);
    let seconds = i64::from_str_radix(hex, 16).map_err(|e| {
        Error::malformed_survey(line, format!("invalid timestamp '{}': {}", text, e))
    })?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::malformed_survey(line, format!("timestamp out of range: {}", text)))
}

/// Parse one HTML survey body into its system
pub fn parse_survey_body(markup: &str, config: &ParserConfig) -> Result<System> {
    let rules = SectionRules::new(config);
    let mut state = MarkupState::new();

    for event in tokenize(markup) {
        match event {
            MarkupEvent::Start(tag) => match tag.as_str() {
                "big" => state.big_depth += 1,
                "b" => state.bold_depth += 1,
                "br" | "p" => state.line += 1,
                _ => {}
            },
            MarkupEvent::End(tag) => match tag.as_str() {
                "big" => state.big_depth = state.big_depth.saturating_sub(1),
                "b" => state.bold_depth = state.bold_depth.saturating_sub(1),
                _ => {}
            },
            MarkupEvent::Text(text) => {
                if state.big_depth > 0 {
                    state.handle_section_title(&text)?;
                } else if state.bold_depth > 0 {
                    state.handle_header(&text)?;
                } else {
                    state.handle_content(&text, &rules)?;
                }
            }
        }
    }

    state.finish()
}

/// Parser for exported in-game mails carrying a system survey
#[derive(Debug, Clone, Default)]
pub struct MailSurveyParser {
    config: ParserConfig,
}

impl MailSurveyParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl SurveyParser for MailSurveyParser {
    fn format(&self) -> SurveyFormat {
        SurveyFormat::MailExport
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<System>> {
        let envelope = MailEnvelope::read(bytes, self.config.mail_length_order)?;
        if !envelope.is_survey(&self.config.survey_title_marker) {
            info!(
                "Skipping mail '{}' from {}: not a system survey",
                envelope.title, envelope.sender
            );
            return Ok(Vec::new());
        }

        let system = parse_survey_body(&envelope.body, &self.config)?;
        info!(
            "Parsed mail survey of {} from {}",
            system.location.system_name(),
            envelope.sender
        );
        Ok(vec![system])
    }
}
