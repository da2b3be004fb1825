//! Per-section body rules shared by the text and mail exports
//!
//! Both exports list a body's details under section headers (`Primary`,
//! `Orbiting ...`, `Photosphere`, `Geosphere`, `Hydrosphere`, `Atmosphere`,
//! `Biosphere`). Only the way a header is recognized differs between them;
//! the content lines under each header are interpreted identically here.

use tracing::debug;

use super::resource_line::{
    Abundance, parse_prevalence, parse_quality, parse_quality_fragment, parse_resource_line,
    parse_zone_fragment, resource_name,
};
use crate::app::models::{Body, BodyKind, Resource};
use crate::config::ParserConfig;
use crate::constants::{BIOSPHERE_PREVALENCE, sections};
use crate::{Error, Result};

/// Separator between zone fragments of a zoned resource row
const ZONE_SEPARATOR: &str = ", ";

/// A body section header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// `Primary` or `Orbiting ...`: star details or orbit zone
    Orbit,
    Photosphere,
    Geosphere,
    Hydrosphere,
    Atmosphere,
    Biosphere,
    /// Any header without content rules
    Other(String),
}

impl Section {
    /// Classify a header line by its first word
    pub fn from_header(header: &str) -> Self {
        let first = header.split_whitespace().next().unwrap_or_default();
        match first {
            sections::PRIMARY | sections::ORBITING => Section::Orbit,
            sections::PHOTOSPHERE => Section::Photosphere,
            sections::GEOSPHERE => Section::Geosphere,
            sections::HYDROSPHERE => Section::Hydrosphere,
            sections::ATMOSPHERE => Section::Atmosphere,
            sections::BIOSPHERE => Section::Biosphere,
            other => Section::Other(other.to_string()),
        }
    }
}

/// Orbited body named by an `Orbiting <body> <angle>` header
///
/// The trailing angle token is dropped because its degree sign arrives in
/// whatever encoding the export used.
pub fn orbit_description(header: &str) -> Option<String> {
    let mut words: Vec<&str> = header.split_whitespace().collect();
    if words.first() != Some(&sections::ORBITING) {
        return None;
    }
    words.remove(0);

    let is_angle = |word: &str| {
        word.chars()
            .any(|c| c.is_ascii_digit() || c == '°' || c == char::REPLACEMENT_CHARACTER)
    };
    if words.last().is_some_and(|word| is_angle(word)) {
        words.pop();
    }

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Remove thousands separators from a diameter token
pub fn normalize_diameter(token: &str) -> String {
    token.trim().replace(',', "")
}

/// Diameter from a radius token, keeping its unit (metres when unitless)
pub fn diameter_from_radius(token: &str) -> Result<String> {
    let cleaned = normalize_diameter(token);
    let split = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(cleaned.len());
    let (number, unit) = cleaned.split_at(split);

    let radius = number
        .parse::<f64>()
        .map_err(|_| Error::data_validation(format!("Invalid radius '{}'", token)))?;
    let unit = if unit.is_empty() { "m" } else { unit };

    Ok(format!("{}{}", radius * 2.0, unit))
}

/// Content rules applied to the lines of one body section
#[derive(Debug, Clone, Copy)]
pub struct SectionRules<'a> {
    config: &'a ParserConfig,
}

impl<'a> SectionRules<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Interpret one content line of `section` for `body`
    pub fn apply(&self, body: &mut Body, section: &Section, line: &str) -> Result<()> {
        let line = line.trim();
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(());
        }

        match section {
            Section::Orbit => self.apply_orbit(body, line, &words),
            Section::Photosphere => self.apply_photosphere(body, line, &words),
            Section::Geosphere => self.apply_geosphere(body, line, &words),
            Section::Hydrosphere | Section::Atmosphere => self.apply_fluid(body, line, &words),
            Section::Biosphere => self.apply_biosphere(body, line),
            Section::Other(name) => {
                debug!("Ignoring '{}' line in section {}", line, name);
                Ok(())
            }
        }
    }

    fn apply_orbit(&self, body: &mut Body, line: &str, words: &[&str]) -> Result<()> {
        match words[0] {
            "Type" => body.mark_star(words[1..].join(" ")),
            "Spectral" => {
                let class = words.get(2).ok_or_else(|| {
                    Error::data_validation(format!("Spectral line without class: '{}'", line))
                })?;
                body.spectral_class = Some(class.to_string());
            }
            "Size" => body.star_size = Some(words[1..].join(" ")),
            _ if !body.is_star() => body.orbit_zone = Some(line.to_string()),
            _ => {}
        }
        Ok(())
    }

    fn apply_photosphere(&self, body: &mut Body, line: &str, words: &[&str]) -> Result<()> {
        if words.last() == Some(&"Diameter") && words.len() >= 2 {
            body.diameter = Some(normalize_diameter(words[words.len() - 2]));
            return Ok(());
        }

        if words[0] == "Type" {
            // Type <adjective> <noun> Q<quality> <prevalence>%
            let [_, _, _, quality, prevalence, ..] = words else {
                return Err(Error::unrecognized_resource(
                    line,
                    "photosphere type row needs five tokens",
                ));
            };
            let resource = Resource::new(
                words[..3].join(" "),
                parse_quality(quality)?,
                parse_prevalence(prevalence)?,
            );
            self.add_global(body, resource);
            return Ok(());
        }

        self.apply_global_resource(body, line)
    }

    fn apply_geosphere(&self, body: &mut Body, line: &str, words: &[&str]) -> Result<()> {
        let last = words[words.len() - 1];
        if (last == "Diameter" || last == "Radius") && words.len() >= 2 {
            let size = words[words.len() - 2];
            body.diameter = Some(if last == "Radius" {
                diameter_from_radius(size)?
            } else {
                normalize_diameter(size)
            });
            let kind = line.split(ZONE_SEPARATOR).next().unwrap_or(line);
            body.body_kind = Some(BodyKind::from_label(kind));
            return Ok(());
        }

        let name = resource_name(line)?;
        for (zone, fragment) in line.split(ZONE_SEPARATOR).enumerate() {
            body.reserve_zones(zone + 1);
            if let Abundance::Present {
                quality,
                prevalence,
            } = parse_zone_fragment(fragment)?
            {
                self.add_zoned(body, zone, Resource::new(name, quality, prevalence));
            }
        }
        Ok(())
    }

    fn apply_fluid(&self, body: &mut Body, line: &str, words: &[&str]) -> Result<()> {
        // "No hydrosphere", "72% ocean coverage", "1.2 atm Density"
        if words[0] == "No" || words[0].ends_with('%') || words.last() == Some(&"Density") {
            return Ok(());
        }
        self.apply_global_resource(body, line)
    }

    fn apply_biosphere(&self, body: &mut Body, line: &str) -> Result<()> {
        let name = resource_name(line)?;
        for (zone, fragment) in line.split(ZONE_SEPARATOR).enumerate() {
            body.reserve_zones(zone + 1);
            if let Some(quality) = parse_quality_fragment(fragment)? {
                self.add_zoned(body, zone, Resource::new(name, quality, BIOSPHERE_PREVALENCE));
            }
        }
        Ok(())
    }

    fn apply_global_resource(&self, body: &mut Body, line: &str) -> Result<()> {
        if let (name, Abundance::Present { quality, prevalence }) = parse_resource_line(line)? {
            self.add_global(body, Resource::new(name, quality, prevalence));
        }
        Ok(())
    }

    fn add_global(&self, body: &mut Body, resource: Resource) {
        if self.config.keeps_prevalence(resource.prevalence) {
            body.add_global_resource(resource);
        }
    }

    fn add_zoned(&self, body: &mut Body, zone: usize, resource: Resource) {
        if self.config.keeps_prevalence(resource.prevalence) {
            body.add_zone_resource(zone, resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZeroPrevalencePolicy;

    fn apply_lines(section: Section, lines: &[&str]) -> Body {
        let config = ParserConfig::default();
        let rules = SectionRules::new(&config);
        let mut body = Body::new("Demo I");
        for line in lines {
            rules.apply(&mut body, &section, line).unwrap();
        }
        body
    }

    #[test]
    fn test_section_from_header() {
        assert_eq!(Section::from_header("Primary"), Section::Orbit);
        assert_eq!(Section::from_header("Orbiting Demo 45°"), Section::Orbit);
        assert_eq!(Section::from_header("Geosphere"), Section::Geosphere);
        assert_eq!(
            Section::from_header("Satellites"),
            Section::Other("Satellites".to_string())
        );
    }

    #[test]
    fn test_orbit_description() {
        assert_eq!(orbit_description("Orbiting Demo 45°"), Some("Demo".to_string()));
        assert_eq!(
            orbit_description("Orbiting Demo II 12.5\u{FFFD}"),
            Some("Demo II".to_string())
        );
        assert_eq!(orbit_description("Orbiting Demo"), Some("Demo".to_string()));
        assert_eq!(orbit_description("Primary"), None);
    }

    #[test]
    fn test_diameter_normalization() {
        assert_eq!(normalize_diameter("12,742m"), "12742m");
        assert_eq!(diameter_from_radius("1,200m").unwrap(), "2400m");
        assert_eq!(diameter_from_radius("35").unwrap(), "70m");
        assert_eq!(diameter_from_radius("1.5Lm").unwrap(), "3Lm");
        assert!(diameter_from_radius("m").is_err());
    }

    #[test]
    fn test_star_lines() {
        let body = apply_lines(
            Section::Orbit,
            &["  Type Yellow Dwarf", "  Spectral Class G2", "  Size Medium"],
        );
        assert!(body.is_star());
        assert_eq!(body.star_type.as_deref(), Some("Yellow Dwarf"));
        assert_eq!(body.spectral_class.as_deref(), Some("G2"));
        assert_eq!(body.star_size.as_deref(), Some("Medium"));
        assert_eq!(body.zones().len(), 1);
        assert!(body.orbit_zone.is_none());
    }

    #[test]
    fn test_orbit_zone_line_for_planet() {
        let body = apply_lines(Section::Orbit, &["  Inner Zone"]);
        assert_eq!(body.orbit_zone.as_deref(), Some("Inner Zone"));
        assert!(!body.is_star());
    }

    #[test]
    fn test_photosphere_lines() {
        let mut star = Body::new("Demo");
        star.mark_star("Yellow Dwarf");
        let config = ParserConfig::default();
        let rules = SectionRules::new(&config);
        for line in [
            "  1,392,000m Diameter",
            "  Type Solar Plasma Q120 40%",
            "  Antiflux Particles Q228 4%",
            "  Dark Matter None",
        ] {
            rules.apply(&mut star, &Section::Photosphere, line).unwrap();
        }

        assert_eq!(star.diameter.as_deref(), Some("1392000m"));
        assert_eq!(
            star.zones()[0].resources,
            vec![
                Resource::new("Type Solar Plasma", 120, 40),
                Resource::new("Antiflux Particles", 228, 4),
            ]
        );
    }

    #[test]
    fn test_geosphere_size_and_kind() {
        let body = apply_lines(Section::Geosphere, &["  Rocky Planet, 6,371m Radius"]);
        assert_eq!(body.diameter.as_deref(), Some("12742m"));
        assert_eq!(
            body.body_kind,
            Some(BodyKind::Named("Rocky Planet".to_string()))
        );
    }

    #[test]
    fn test_geosphere_zone_fan_out() {
        let body = apply_lines(Section::Geosphere, &["  Ore Q64 12%, None, Q60 8%"]);
        assert_eq!(body.zones().len(), 3);
        assert_eq!(body.zones()[0].resources, vec![Resource::new("Ore", 64, 12)]);
        assert!(body.zones()[1].resources.is_empty());
        assert_eq!(body.zones()[2].resources, vec![Resource::new("Ore", 60, 8)]);
    }

    #[test]
    fn test_geosphere_none_grows_zones_without_resources() {
        let body = apply_lines(Section::Geosphere, &["  Ore None, None, Q64 None"]);
        assert_eq!(body.zones().len(), 3);
        assert!(body.zones().iter().all(|zone| zone.resources.is_empty()));
    }

    #[test]
    fn test_fluid_lines_skip_descriptions() {
        let mut body = Body::new("Demo I");
        body.reserve_zones(2);
        let config = ParserConfig::default();
        let rules = SectionRules::new(&config);
        for line in [
            "  No hydrosphere",
            "  72% Ocean",
            "  1.2 atm Density",
            "  Water Q30 70%",
        ] {
            rules.apply(&mut body, &Section::Hydrosphere, line).unwrap();
        }

        for zone in body.zones() {
            assert_eq!(zone.resources, vec![Resource::new("Water", 30, 70)]);
        }
    }

    #[test]
    fn test_biosphere_implicit_prevalence() {
        let body = apply_lines(Section::Biosphere, &["  Vegetation Q12, None, Q30"]);
        assert_eq!(body.zones().len(), 3);
        assert_eq!(
            body.zones()[0].resources,
            vec![Resource::new("Vegetation", 12, 100)]
        );
        assert!(body.zones()[1].resources.is_empty());
        assert_eq!(
            body.zones()[2].resources,
            vec![Resource::new("Vegetation", 30, 100)]
        );
    }

    #[test]
    fn test_unrecognized_resource_is_fatal() {
        let config = ParserConfig::default();
        let rules = SectionRules::new(&config);
        let mut body = Body::new("Demo I");
        let result = rules.apply(&mut body, &Section::Geosphere, "  Ore twelve percent");
        assert!(matches!(result, Err(Error::UnrecognizedResource { .. })));
    }

    #[test]
    fn test_zero_prevalence_policy() {
        let line = "  Ore Q64 0%, Q60 5%";

        let keep = apply_lines(Section::Geosphere, &[line]);
        assert_eq!(keep.zones()[0].resources.len(), 1);

        let config = ParserConfig::default().with_zero_prevalence(ZeroPrevalencePolicy::Drop);
        let rules = SectionRules::new(&config);
        let mut dropped = Body::new("Demo I");
        rules.apply(&mut dropped, &Section::Geosphere, line).unwrap();
        assert_eq!(dropped.zones().len(), 2);
        assert!(dropped.zones()[0].resources.is_empty());
        assert_eq!(dropped.zones()[1].resources.len(), 1);
    }
}
