//! Fixtures for survey store tests

use chrono::{DateTime, TimeZone, Utc};

use crate::app::models::{Coordinates, Location, Polarity, Resource, System, SystemBuilder};


/// Survey date on the given day of March 2013
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2013, 3, day, 12, 0, 0).unwrap()
}

/// A surveyed system with one star and one planet
///
/// The star carries "Solar Wind" and the planet "Ore" in two zones plus a
/// global "Air".
pub fn create_test_system(
    name: &str,
    sector: &str,
    sector_coords: Coordinates,
    scan_date: Option<DateTime<Utc>>,
    ore_quality: u32,
) -> System {
    let mut builder = SystemBuilder::new(scan_date);
    builder.set_location(Location::new(
        name,
        sector,
        Coordinates::new(1.0, 2.0, 3.0),
        sector_coords,
    ));
    builder
        .add_wormhole(
            Polarity::Negative,
            Location::new(
                "Far",
                "Beyond",
                Coordinates::new(0.0, 0.0, 0.0),
                Coordinates::new(9.0, 9.0, 9.0),
            ),
        )
        .unwrap();

    let star = builder.start_body(name);
    star.mark_star("Yellow Dwarf");
    star.add_global_resource(Resource::new("Solar Wind", 40, 60));

    let planet = builder.start_body(format!("{} I", name));
    planet.reserve_zones(2);
    planet.add_zone_resource(0, Resource::new("Ore", ore_quality, 12));
    planet.add_zone_resource(1, Resource::new("Ore", ore_quality / 2, 8));
    planet.add_global_resource(Resource::new("Air", 20, 70));

    builder.build().unwrap()
}

/// Demo system in the Andromeda sector at grid (4, 5, -6)
pub fn demo_system(scan_date: Option<DateTime<Utc>>, ore_quality: u32) -> System {
    create_test_system(
        "Demo",
        "Andromeda",
        Coordinates::new(4.0, 5.0, -6.0),
        scan_date,
        ore_quality,
    )
}
