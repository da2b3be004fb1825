//! Data models for Hazeron surveys
//!
//! This module contains the format-agnostic records every survey parser
//! populates. A [`System`] owns its bodies, each [`Body`] owns its zones and
//! each [`Zone`] owns its resources. The only shared value is the system's
//! [`Location`], which every outgoing [`Wormhole`] references as its source.

use crate::app::services::location_resolver::{resolve_local, resolve_universal};
use crate::constants::tech_level_for_quality;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Coordinates and Locations
// =============================================================================

/// An `(x, y, z)` position, either system-local/universal parsecs or sector-grid cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// Names and coordinates identifying a star system
///
/// The universal position is derived from the local and grid coordinates in
/// the constructors and cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    system_name: String,
    sector_name: String,
    system_coords: Coordinates,
    sector_coords: Coordinates,
    universal_coords: Coordinates,
}

impl Location {
    /// Build a location from system-local and sector-grid coordinates
    pub fn new(
        system_name: impl Into<String>,
        sector_name: impl Into<String>,
        system_coords: Coordinates,
        sector_coords: Coordinates,
    ) -> Self {
        Self {
            system_name: system_name.into(),
            sector_name: sector_name.into(),
            system_coords,
            sector_coords,
            universal_coords: resolve_universal(system_coords, sector_coords),
        }
    }

    /// Build a location from universal and sector-grid coordinates
    pub fn from_universal(
        system_name: impl Into<String>,
        sector_name: impl Into<String>,
        universal_coords: Coordinates,
        sector_coords: Coordinates,
    ) -> Self {
        Self::new(
            system_name,
            sector_name,
            resolve_local(universal_coords, sector_coords),
            sector_coords,
        )
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn sector_name(&self) -> &str {
        &self.sector_name
    }

    pub fn system_coords(&self) -> Coordinates {
        self.system_coords
    }

    pub fn sector_coords(&self) -> Coordinates {
        self.sector_coords
    }

    pub fn universal_coords(&self) -> Coordinates {
        self.universal_coords
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) in {} ({})",
            self.system_name, self.system_coords, self.sector_name, self.sector_coords
        )
    }
}

// =============================================================================
// Resources and Zones
// =============================================================================

/// One harvestable material entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub name: String,
    pub quality: u32,
    pub prevalence: u32,
}

impl Resource {
    pub fn new(name: impl Into<String>, quality: u32, prevalence: u32) -> Self {
        Self {
            name: name.into(),
            quality,
            prevalence,
        }
    }

    /// Tech level needed to exploit this resource, derived from its quality
    pub fn tech_level(&self) -> u32 {
        tech_level_for_quality(self.quality)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Q{} {}% (TL{})",
            self.name,
            self.quality,
            self.prevalence,
            self.tech_level()
        )
    }
}

/// An orbital or atmospheric band of a body with its own resource abundances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub resources: Vec<Resource>,
}

impl Zone {
    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }
}

// =============================================================================
// Bodies
// =============================================================================

/// Kind of celestial body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Star,
    /// Kind text reported by the survey, e.g. "Rocky Planet" or "Ring"
    Named(String),
}

impl BodyKind {
    /// Interpret a kind string, mapping "star" onto [`BodyKind::Star`]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("star") {
            BodyKind::Star
        } else {
            BodyKind::Named(label.to_string())
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyKind::Star => write!(f, "star"),
            BodyKind::Named(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for BodyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A star, planet, moon, gas giant or ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    pub name: String,
    pub body_kind: Option<BodyKind>,
    pub star_type: Option<String>,
    pub spectral_class: Option<String>,
    pub star_size: Option<String>,
    pub diameter: Option<String>,
    pub orbits: Option<String>,
    pub orbit_zone: Option<String>,
    zones: Vec<Zone>,
}

impl Body {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body_kind: None,
            star_type: None,
            spectral_class: None,
            star_size: None,
            diameter: None,
            orbits: None,
            orbit_zone: None,
            zones: Vec::new(),
        }
    }

    pub fn is_star(&self) -> bool {
        self.body_kind == Some(BodyKind::Star)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Mark this body as a star of the given type, fixing its zone count at one
    pub fn mark_star(&mut self, star_type: impl Into<String>) {
        self.body_kind = Some(BodyKind::Star);
        self.star_type = Some(star_type.into());
        self.zones.truncate(1);
        if self.zones.is_empty() {
            self.zones.push(Zone::default());
        }
    }

    /// Grow the zone list to at least `count` zones
    ///
    /// Stars keep their single zone.
    pub fn reserve_zones(&mut self, count: usize) {
        if self.is_star() {
            return;
        }
        if self.zones.len() < count {
            self.zones.resize_with(count, Zone::default);
        }
    }

    /// Add a resource present throughout the body to every existing zone
    pub fn add_global_resource(&mut self, resource: Resource) {
        if self.zones.is_empty() {
            debug!(
                "Body '{}' has no zones yet, dropping global resource {}",
                self.name, resource
            );
            return;
        }
        for zone in &mut self.zones {
            zone.add_resource(resource.clone());
        }
    }

    /// Add a resource to one zone, growing the zone list to cover it
    ///
    /// Stars fold every zoned resource into their single zone.
    pub fn add_zone_resource(&mut self, index: usize, resource: Resource) {
        let index = if self.is_star() { 0 } else { index };
        if self.zones.len() <= index {
            self.zones.resize_with(index + 1, Zone::default);
        }
        self.zones[index].add_resource(resource);
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(value: &Option<impl fmt::Display>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        }

        writeln!(f, "-------------")?;
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {}", field(&self.body_kind))?;
        if self.is_star() {
            writeln!(f, "  {}", field(&self.star_type))?;
            writeln!(f, "  {}", field(&self.spectral_class))?;
            writeln!(f, "  {}", field(&self.star_size))?;
        }
        writeln!(f, "  {}", field(&self.diameter))?;
        writeln!(f, "  {}", field(&self.orbits))?;
        writeln!(f, "  {}", field(&self.orbit_zone))?;

        for (index, zone) in self.zones.iter().enumerate() {
            writeln!(f, "Zone {}:", index)?;
            for resource in &zone.resources {
                writeln!(f, "{}", resource)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Wormholes
// =============================================================================

/// Direction of a wormhole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl FromStr for Polarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            p if p.eq_ignore_ascii_case("positive") => Ok(Polarity::Positive),
            p if p.eq_ignore_ascii_case("negative") => Ok(Polarity::Negative),
            _ => Err(Error::data_validation(format!(
                "Invalid wormhole polarity '{}': must be Positive or Negative",
                s
            ))),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "Positive"),
            Polarity::Negative => write!(f, "Negative"),
        }
    }
}

/// Directional link leaving a surveyed system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wormhole {
    pub polarity: Polarity,
    /// Same allocation as the owning system's location
    pub source: Arc<Location>,
    pub dest: Location,
}

impl fmt::Display for Wormhole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wormhole from {} to {}",
            self.polarity, self.source, self.dest
        )
    }
}

// =============================================================================
// Systems
// =============================================================================

/// One surveyed star system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct System {
    pub location: Arc<Location>,
    /// Present in text and mail surveys, absent from starmaps
    pub scan_date: Option<DateTime<Utc>>,
    pub wormholes: Vec<Wormhole>,
    pub bodies: Vec<Body>,
}

impl System {
    /// Find a body by exact name
    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|body| body.name == name)
    }

    /// Total number of resource entries across all bodies and zones
    pub fn resource_count(&self) -> usize {
        self.bodies
            .iter()
            .flat_map(|body| body.zones())
            .map(|zone| zone.resources.len())
            .sum()
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)?;
        if let Some(date) = self.scan_date {
            write!(f, "\nScanned on: {}", date.format("%m/%d/%y %I:%M %p"))?;
        }
        for wormhole in &self.wormholes {
            write!(f, "\n{}", wormhole)?;
        }
        for body in &self.bodies {
            write!(f, "\n{}", body)?;
        }
        Ok(())
    }
}

/// Incrementally assembled system
///
/// Parsers fill a builder while reading one system's block and call
/// [`SystemBuilder::build`] once the block ends, so a system missing its
/// location never escapes.
#[derive(Debug, Default)]
pub struct SystemBuilder {
    scan_date: Option<DateTime<Utc>>,
    location: Option<Arc<Location>>,
    wormholes: Vec<Wormhole>,
    bodies: Vec<Body>,
}

impl SystemBuilder {
    pub fn new(scan_date: Option<DateTime<Utc>>) -> Self {
        Self {
            scan_date,
            ..Self::default()
        }
    }

    /// Set the system's location, returning the shared handle
    pub fn set_location(&mut self, location: Location) -> Arc<Location> {
        let location = Arc::new(location);
        self.location = Some(Arc::clone(&location));
        location
    }

    pub fn location(&self) -> Option<&Arc<Location>> {
        self.location.as_ref()
    }

    /// Record a wormhole leaving this system
    pub fn add_wormhole(&mut self, polarity: Polarity, dest: Location) -> Result<()> {
        let source = self.location.as_ref().ok_or_else(|| {
            Error::data_validation("Wormhole listed before the system location")
        })?;
        self.wormholes.push(Wormhole {
            polarity,
            source: Arc::clone(source),
            dest,
        });
        Ok(())
    }

    /// Start a new body and return it for population
    pub fn start_body(&mut self, name: impl Into<String>) -> &mut Body {
        self.bodies.push(Body::new(name));
        let index = self.bodies.len() - 1;
        &mut self.bodies[index]
    }

    /// Append an already populated body
    pub fn push_body(&mut self, body: Body) {
        self.bodies.push(body);
    }

    /// The body currently being populated
    pub fn current_body_mut(&mut self) -> Option<&mut Body> {
        self.bodies.last_mut()
    }

    /// Finish the system; `None` when no location was ever parsed
    pub fn build(self) -> Option<System> {
        let location = self.location?;
        Some(System {
            location,
            scan_date: self.scan_date,
            wormholes: self.wormholes,
            bodies: self.bodies,
        })
    }
}
