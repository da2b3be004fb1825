//! Coordinate resolution between local, sector-grid and universal space
//!
//! Every survey format describes a position with two half-coordinates. The
//! text and mail exports give a system-local position plus a sector-grid
//! cell; the starmap gives the universal position plus the grid cell. These
//! functions convert between the two representations on each axis
//! independently, with one grid cell spanning [`GRID_CELL_PARSECS`].
//!
//! Exports write coordinates as short decimals, so both directions round to
//! [`COORDINATE_SCALE`] steps: `41.3` in cell `4` resolves to exactly `1.3`.

use crate::app::models::Coordinates;
use crate::constants::{COORDINATE_SCALE, GRID_CELL_PARSECS};

/// Universal position of a system-local position inside a grid cell
pub fn resolve_universal(local: Coordinates, grid: Coordinates) -> Coordinates {
    Coordinates::new(
        snap(local.x + grid.x * GRID_CELL_PARSECS),
        snap(local.y + grid.y * GRID_CELL_PARSECS),
        snap(local.z + grid.z * GRID_CELL_PARSECS),
    )
}

/// Local position relative to a grid cell, the inverse of [`resolve_universal`]
pub fn resolve_local(universal: Coordinates, grid: Coordinates) -> Coordinates {
    Coordinates::new(
        snap(universal.x - grid.x * GRID_CELL_PARSECS),
        snap(universal.y - grid.y * GRID_CELL_PARSECS),
        snap(universal.z - grid.z * GRID_CELL_PARSECS),
    )
}

fn snap(value: f64) -> f64 {
    let snapped = (value * COORDINATE_SCALE).round() / COORDINATE_SCALE;
    // Keep -0.0 out of rendered locations
    if snapped == 0.0 { 0.0 } else { snapped }
}
