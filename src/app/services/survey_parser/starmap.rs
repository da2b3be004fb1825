//! XML starmap export
//!
//! The starmap is a typed tree (`starmap > galaxy > sector > system`) with
//! numeric attributes instead of free text. Systems carry universal
//! coordinates and their sector carries grid coordinates, so locations are
//! built through [`Location::from_universal`].

use roxmltree::{Document, Node};
use tracing::{debug, info};

use super::resource_line::{parse_prevalence, parse_quality};
use super::sections::normalize_diameter;
use super::{SurveyFormat, SurveyParser};
use crate::app::models::{
    Body, BodyKind, Coordinates, Location, Polarity, Resource, System, SystemBuilder,
};
use crate::config::ParserConfig;
use crate::constants::{MAX_RESOURCE_ZONES, STARMAP_SURVEYED, is_absent_marker};
use crate::{Error, Result};

/// Parser for the XML starmap export
#[derive(Debug, Clone, Default)]
pub struct StarmapParser {
    config: ParserConfig,
}

impl StarmapParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse starmap XML into its fully surveyed systems
    pub fn parse_str(&self, xml: &str) -> Result<Vec<System>> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if !root.has_tag_name("starmap") {
            return Err(Error::starmap(format!(
                "root element is <{}>, expected <starmap>",
                root.tag_name().name()
            )));
        }

        let mut systems = Vec::new();
        let mut skipped = 0usize;
        for galaxy in elements(root, "galaxy") {
            for sector in elements(galaxy, "sector") {
                let sector_name = required_attr(sector, "name")?;
                let sector_coords = coordinates(sector, ["x", "y", "z"])?;

                for system in elements(sector, "system") {
                    if system.attribute("eod") != Some(STARMAP_SURVEYED) {
                        skipped += 1;
                        continue;
                    }
                    systems.push(self.read_system(system, sector_name, sector_coords)?);
                }
            }
        }

        info!(
            "Parsed {} surveyed systems from starmap ({} not surveyed)",
            systems.len(),
            skipped
        );
        Ok(systems)
    }

    fn read_system(
        &self,
        node: Node<'_, '_>,
        sector_name: &str,
        sector: Coordinates,
    ) -> Result<System> {
        let location = Location::from_universal(
            required_attr(node, "name")?,
            sector_name,
            coordinates(node, ["x", "y", "z"])?,
            sector,
        );

        let mut builder = SystemBuilder::new(None);
        let location = builder.set_location(location);
        debug!("Reading starmap system {}", location);

        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "wormhole" => {
                    let polarity = required_attr(child, "polarity")?.parse::<Polarity>()?;
                    let dest = Location::from_universal(
                        required_attr(child, "name")?,
                        required_attr(child, "sector")?,
                        coordinates(child, ["x", "y", "z"])?,
                        coordinates(child, ["sectorX", "sectorY", "sectorZ"])?,
                    );
                    builder.add_wormhole(polarity, dest)?;
                }
                "star" => builder.push_body(self.read_star(child)?),
                "planet" => builder.push_body(self.read_planet(child)?),
                other => debug!("Ignoring <{}> in system {}", other, location.system_name()),
            }
        }

        builder
            .build()
            .ok_or_else(|| Error::starmap("system built without a location"))
    }

    fn read_star(&self, node: Node<'_, '_>) -> Result<Body> {
        let mut star = Body::new(required_attr(node, "name")?);
        star.mark_star(node.attribute("type").unwrap_or_default());
        star.spectral_class = node.attribute("spectralClass").map(str::to_string);
        star.star_size = node.attribute("size").map(str::to_string);
        star.diameter = node.attribute("diameter").map(normalize_diameter);

        for resource in elements(node, "resource") {
            let name = required_attr(resource, "name")?;
            let abundance = match read_abundance(resource, "quality", "abundance")? {
                Some(abundance) => Some(abundance),
                None => read_abundance(resource, "qualityZone1", "abundanceZone1")?,
            };
            if let Some((quality, prevalence)) = abundance {
                self.add_resource(&mut star, 0, Resource::new(name, quality, prevalence));
            }
        }
        Ok(star)
    }

    fn read_planet(&self, node: Node<'_, '_>) -> Result<Body> {
        let mut planet = Body::new(required_attr(node, "name")?);
        planet.body_kind = node.attribute("kind").map(BodyKind::from_label);
        planet.diameter = node.attribute("diameter").map(normalize_diameter);
        planet.orbits = node.attribute("orbits").map(str::to_string);
        planet.orbit_zone = node.attribute("zone").map(str::to_string);

        let zone_count = match node.attribute("resourceZones") {
            Some(count) => count.trim().parse::<usize>().map_err(|e| {
                Error::starmap(format!(
                    "invalid resourceZones '{}' on {}: {}",
                    count, planet.name, e
                ))
            })?,
            None => 1,
        };
        if zone_count > MAX_RESOURCE_ZONES {
            return Err(Error::starmap(format!(
                "{} declares {} resource zones, more than the {} allowed",
                planet.name, zone_count, MAX_RESOURCE_ZONES
            )));
        }
        planet.reserve_zones(zone_count);

        for resource in elements(node, "resource") {
            let name = required_attr(resource, "name")?;
            for zone in 1..=zone_count {
                let quality_attr = format!("qualityZone{}", zone);
                let abundance_attr = format!("abundanceZone{}", zone);
                if let Some((quality, prevalence)) =
                    read_abundance(resource, &quality_attr, &abundance_attr)?
                {
                    let resource = Resource::new(name, quality, prevalence);
                    self.add_resource(&mut planet, zone - 1, resource);
                }
            }
        }
        Ok(planet)
    }

    fn add_resource(&self, body: &mut Body, zone: usize, resource: Resource) {
        if self.config.keeps_prevalence(resource.prevalence) {
            body.add_zone_resource(zone, resource);
        }
    }
}

impl SurveyParser for StarmapParser {
    fn format(&self) -> SurveyFormat {
        SurveyFormat::Starmap
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<System>> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| Error::starmap(format!("starmap is not valid UTF-8: {}", e)))?;
        self.parse_str(xml)
    }
}

/// Child elements with the given tag name
fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(name))
}

fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        Error::starmap(format!(
            "<{}> is missing the '{}' attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn number_attr(node: Node<'_, '_>, name: &str) -> Result<f64> {
    let value = required_attr(node, name)?;
    value.trim().parse::<f64>().map_err(|e| {
        Error::starmap(format!(
            "<{}> attribute {}='{}' is not a number: {}",
            node.tag_name().name(),
            name,
            value,
            e
        ))
    })
}

fn coordinates(node: Node<'_, '_>, [x, y, z]: [&str; 3]) -> Result<Coordinates> {
    Ok(Coordinates::new(
        number_attr(node, x)?,
        number_attr(node, y)?,
        number_attr(node, z)?,
    ))
}

/// Quality and abundance of one attribute pair; `None` when absent
fn read_abundance(
    node: Node<'_, '_>,
    quality: &str,
    abundance: &str,
) -> Result<Option<(u32, u32)>> {
    match (node.attribute(quality), node.attribute(abundance)) {
        (Some(q), Some(a)) if !is_absent_marker(q.trim()) && !is_absent_marker(a.trim()) => {
            Ok(Some((parse_quality(q)?, parse_prevalence(a)?)))
        }
        _ => Ok(None),
    }
}
