//! Tests for the plain-text console parser

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use super::*;
use crate::Error;
use crate::app::models::{BodyKind, Polarity, Resource};
use crate::app::services::survey_parser::{TextSurveyParser, parse_text};
use crate::config::{ParserConfig, ZeroPrevalencePolicy};

/// Minimal survey header with no wormholes, followed by `bodies`
fn survey_with_bodies(bodies: &str) -> String {
    format!(
        concat!(
            "03/14/13 09:26 PM\n\nOfficer\nActivity\nLocation\n",
            "Demo (1, 2, 3)\nAndromeda Sector (0, 0, 0)\n\n",
            "A\nB\nWormholes\n\n{}"
        ),
        bodies
    )
}

#[test]
fn test_parse_demo_survey() {
    let systems = parse_text(DEMO_TEXT_SURVEY.as_bytes()).unwrap();
    assert_eq!(systems.len(), 1);

    let system = &systems[0];
    assert_eq!(*system.location, demo_location());
    assert_eq!(
        system.scan_date,
        Some(Utc.with_ymd_and_hms(2013, 3, 14, 21, 26, 0).unwrap())
    );

    assert_eq!(system.wormholes.len(), 1);
    let wormhole = &system.wormholes[0];
    assert_eq!(wormhole.polarity, Polarity::Positive);
    assert_eq!(wormhole.dest, far_location());
    assert!(Arc::ptr_eq(&wormhole.source, &system.location));

    let star = system.body("Demo").unwrap();
    assert!(star.is_star());
    assert_eq!(star.star_type.as_deref(), Some("Yellow Dwarf"));
    assert_eq!(star.spectral_class.as_deref(), Some("G2"));
    assert_eq!(star.star_size.as_deref(), Some("Medium"));
    assert_eq!(star.diameter.as_deref(), Some("1392000m"));
    assert_eq!(star.zones().len(), 1);
    assert_eq!(
        star.zones()[0].resources,
        vec![
            Resource::new("Type Solar Plasma", 120, 40),
            Resource::new("Antiflux Particles", 228, 4),
        ]
    );

    let planet = system.body("Demo I").unwrap();
    assert_eq!(planet.body_kind, Some(BodyKind::Named("Rocky Planet".to_string())));
    assert_eq!(planet.orbits.as_deref(), Some("Demo"));
    assert_eq!(planet.orbit_zone.as_deref(), Some("Inner Zone"));
    assert_eq!(planet.diameter.as_deref(), Some("12742m"));
    assert_eq!(planet.zones().len(), 3);
    assert_eq!(
        planet.zones()[0].resources,
        vec![
            Resource::new("Ore", 64, 12),
            Resource::new("Air", 20, 70),
            Resource::new("Vegetation", 12, 100),
        ]
    );
    assert_eq!(planet.zones()[1].resources, vec![Resource::new("Air", 20, 70)]);
    assert_eq!(
        planet.zones()[2].resources,
        vec![
            Resource::new("Ore", 60, 8),
            Resource::new("Air", 20, 70),
            Resource::new("Vegetation", 30, 100),
        ]
    );
}

#[test]
fn test_location_without_orbit_line() {
    let input = DEMO_TEXT_SURVEY.replace("Orbiting Demo I\n", "");
    let systems = parse_text(input.as_bytes()).unwrap();
    assert_eq!(*systems[0].location, demo_location());
    assert_eq!(systems[0].bodies.len(), 2);
}

#[test]
fn test_multiple_systems_in_order() {
    let second = DEMO_TEXT_SURVEY
        .replace("03/14/13 09:26 PM", "03/15/13 10:00 AM")
        .replace("Demo (1.5, -2.25, 3)", "Other (0, 0, 0)");
    let input = format!("{}\n{}", DEMO_TEXT_SURVEY, second);

    let systems = parse_text(input.as_bytes()).unwrap();
    assert_eq!(systems.len(), 2);
    assert_eq!(systems[0].location.system_name(), "Demo");
    assert_eq!(systems[1].location.system_name(), "Other");
    assert_eq!(systems[1].bodies.len(), 2);
}

#[test]
fn test_blank_line_resets_body_state() {
    let input = survey_with_bodies(
        "Alpha\nGeosphere\n  Ore Q64 12%, Q60 8%\n\nBeta\nGeosphere\n  Ice Q10 5%\n",
    );
    let systems = parse_text(input.as_bytes()).unwrap();
    let system = &systems[0];

    assert!(system.wormholes.is_empty());
    let beta = system.body("Beta").unwrap();
    assert_eq!(beta.zones().len(), 1);
    assert_eq!(beta.zones()[0].resources, vec![Resource::new("Ice", 10, 5)]);
    assert_eq!(system.body("Alpha").unwrap().zones().len(), 2);
}

#[test]
fn test_geosphere_none_zone_grows_without_resource() {
    let input = survey_with_bodies("Rock\nGeosphere\n  Ore Q10 5%, Ore Q64 None, Q12 3%\n");
    let systems = parse_text(input.as_bytes()).unwrap();
    let rock = systems[0].body("Rock").unwrap();

    assert_eq!(rock.zones().len(), 3);
    assert_eq!(rock.zones()[0].resources, vec![Resource::new("Ore", 10, 5)]);
    assert!(rock.zones()[1].resources.is_empty());
    assert_eq!(rock.zones()[2].resources, vec![Resource::new("Ore", 12, 3)]);
}

#[test]
fn test_truncated_survey_is_fatal() {
    let truncated = "03/14/13 09:26 PM\n\nOfficer\nActivity\nLocation\nDemo (1, 2, 3)\n";
    let result = parse_text(truncated.as_bytes());
    assert!(matches!(result, Err(Error::UnexpectedEof { .. })));

    let unterminated_wormholes = DEMO_TEXT_SURVEY
        .split("Charted by Vex")
        .next()
        .unwrap()
        .to_string();
    let result = parse_text(unterminated_wormholes.as_bytes());
    assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
}

#[test]
fn test_unrecognized_resource_aborts_parse() {
    let input = survey_with_bodies("Rock\nAtmosphere\n  Strange readings\n");
    let result = parse_text(input.as_bytes());
    assert!(matches!(result, Err(Error::UnrecognizedResource { .. })));
}

#[test]
fn test_lines_before_first_header_are_skipped() {
    let input = format!("Exported log\n\n{}", DEMO_TEXT_SURVEY);
    let systems = parse_text(input.as_bytes()).unwrap();
    assert_eq!(systems.len(), 1);
}

#[test]
fn test_crlf_and_bom_input() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend(DEMO_TEXT_SURVEY.replace('\n', "\r\n").into_bytes());

    let systems = parse_text(&bytes).unwrap();
    assert_eq!(systems.len(), 1);
    assert_eq!(*systems[0].location, demo_location());
    assert_eq!(systems[0].body("Demo I").unwrap().zones().len(), 3);
}

#[test]
fn test_zero_prevalence_drop_policy() {
    let input = survey_with_bodies("Rock\nGeosphere\n  Ore Q10 0%, Q12 3%\n");

    let kept = TextSurveyParser::default().parse_str(&input).unwrap();
    assert_eq!(kept[0].resource_count(), 2);

    let config = ParserConfig::default().with_zero_prevalence(ZeroPrevalencePolicy::Drop);
    let dropped = TextSurveyParser::new(config).parse_str(&input).unwrap();
    assert_eq!(dropped[0].resource_count(), 1);
    assert_eq!(dropped[0].body("Rock").unwrap().zones().len(), 2);
}
