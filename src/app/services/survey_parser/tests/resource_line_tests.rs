//! Tests for resource fragment tokenization

use crate::Error;
use crate::app::services::survey_parser::resource_line::{
    Abundance, parse_prevalence, parse_quality, parse_quality_fragment, parse_resource_line,
    parse_zone_fragment, resource_name, tokenize,
};

#[test]
fn test_name_quality_prevalence() {
    let tokens = tokenize("Antiflux Particles Q228 4%").unwrap().unwrap();
    assert_eq!(tokens.name, "Antiflux Particles");
    assert_eq!(tokens.quality, "Q228");
    assert_eq!(tokens.prevalence, "4%");

    let (name, abundance) = parse_resource_line("Antiflux Particles Q228 4%").unwrap();
    assert_eq!(name, "Antiflux Particles");
    assert_eq!(
        abundance,
        Abundance::Present {
            quality: 228,
            prevalence: 4
        }
    );
}

#[test]
fn test_none_row_yields_no_resource() {
    assert_eq!(tokenize("Some Resource None").unwrap(), None);

    let (name, abundance) = parse_resource_line("Some Resource None").unwrap();
    assert_eq!(name, "Some Resource");
    assert_eq!(abundance, Abundance::Absent);
}

#[test]
fn test_shorter_candidate_wins() {
    // " None" inside the name cuts it before the quality delimiter would
    assert_eq!(resource_name("Ice None Such Q12 5%").unwrap(), "Ice");
    // " Q" inside the name cuts it early as well
    assert_eq!(resource_name("Deep Quartz Q40 10%").unwrap(), "Deep");
    assert_eq!(resource_name("  Water Q30 70%  ").unwrap(), "Water");
}

#[test]
fn test_line_without_delimiter_is_fatal() {
    let result = resource_name("Strange Readings 12 4");
    assert!(matches!(result, Err(Error::UnrecognizedResource { .. })));
    assert!(parse_resource_line("Q12 4%").is_err());
}

#[test]
fn test_zone_fragments() {
    assert_eq!(
        parse_zone_fragment(" Q60 8%").unwrap(),
        Abundance::Present {
            quality: 60,
            prevalence: 8
        }
    );
    assert_eq!(parse_zone_fragment("None").unwrap(), Abundance::Absent);
    assert_eq!(parse_zone_fragment("Ore Q64 None").unwrap(), Abundance::Absent);
    assert!(parse_zone_fragment("").is_err());
    assert!(parse_zone_fragment("Q60").is_err());
}

#[test]
fn test_quality_fragments() {
    assert_eq!(parse_quality_fragment("Vegetation Q12").unwrap(), Some(12));
    assert_eq!(parse_quality_fragment(" None").unwrap(), None);
    assert!(parse_quality_fragment("  ").is_err());
}

#[test]
fn test_decorations_are_optional() {
    assert_eq!(parse_quality("Q228").unwrap(), 228);
    assert_eq!(parse_quality("228").unwrap(), 228);
    assert_eq!(parse_prevalence("4%").unwrap(), 4);
    assert_eq!(parse_prevalence("4").unwrap(), 4);
    assert!(parse_prevalence("101%").is_err());
    assert!(parse_quality("Qx").is_err());
}
