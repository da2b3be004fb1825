//! Resource search across stored surveys
//!
//! A [`ResourceQuery`] combines any number of filters; every filter left
//! unset matches everything. Name filters are case-insensitive substring
//! matches. Results are ordered by resource name, best quality first.

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Serialize;

use super::SurveyStore;
use crate::app::models::Coordinates;
use crate::{Error, Result};

/// Sector-grid region restricting the searched systems
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectorRegion {
    /// Sectors with every grid coordinate between the corners (inclusive)
    BoundingBox { min: Coordinates, max: Coordinates },
    /// Sectors within `radius` grid cells of `center`
    Radius { center: Coordinates, radius: f64 },
}

impl SectorRegion {
    /// Bounding box from two arbitrary corners
    pub fn bounding_box(a: Coordinates, b: Coordinates) -> Self {
        SectorRegion::BoundingBox {
            min: Coordinates::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Coordinates::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn radius(center: Coordinates, radius: f64) -> Self {
        SectorRegion::Radius { center, radius }
    }
}

/// Resource search filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceQuery {
    pub name: Option<String>,
    pub min_tech_level: Option<u32>,
    pub body: Option<String>,
    pub system: Option<String>,
    pub sector: Option<String>,
    pub region: Option<SectorRegion>,
}

impl ResourceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match resource names containing `name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_min_tech_level(mut self, tech_level: u32) -> Self {
        self.min_tech_level = Some(tech_level);
        self
    }

    /// Match body names containing `body`
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Match system names containing `system`
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Match sector names containing `sector`
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_region(mut self, region: SectorRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// WHERE clause and its bound values
    fn where_clause(&self) -> Result<(String, Vec<Value>)> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        let substring_filters = [
            ("resources.name", &self.name),
            ("bodies.name", &self.body),
            ("surveys.system_name", &self.system),
            ("surveys.sector_name", &self.sector),
        ];
        for (column, filter) in substring_filters {
            if let Some(text) = filter {
                conditions.push(format!("{} LIKE ? ESCAPE '\\'", column));
                values.push(Value::Text(like_pattern(text)));
            }
        }

        if let Some(tech_level) = self.min_tech_level {
            conditions.push("resources.tl >= ?".to_string());
            values.push(Value::Integer(i64::from(tech_level)));
        }

        match self.region {
            Some(SectorRegion::BoundingBox { min, max }) => {
                let axes = [("x", min.x, max.x), ("y", min.y, max.y), ("z", min.z, max.z)];
                for (axis, low, high) in axes {
                    conditions.push(format!("surveys.sector_{} BETWEEN ? AND ?", axis));
                    values.push(Value::Real(low));
                    values.push(Value::Real(high));
                }
            }
            Some(SectorRegion::Radius { center, radius }) => {
                if radius < 0.0 || !radius.is_finite() {
                    return Err(Error::data_validation(format!(
                        "Search radius must be a non-negative number, got {}",
                        radius
                    )));
                }
                conditions.push(
                    "((surveys.sector_x - ?) * (surveys.sector_x - ?)
                      + (surveys.sector_y - ?) * (surveys.sector_y - ?)
                      + (surveys.sector_z - ?) * (surveys.sector_z - ?)) <= ?"
                        .to_string(),
                );
                for value in [center.x, center.x, center.y, center.y, center.z, center.z] {
                    values.push(Value::Real(value));
                }
                values.push(Value::Real(radius * radius));
            }
            None => {}
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        Ok((clause, values))
    }
}

/// Substring LIKE pattern with wildcards in `text` escaped
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// One matching resource with its body and system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceHit {
    pub resource: String,
    pub tech_level: u32,
    pub quality: u32,
    pub prevalence: u32,
    pub zone: u32,
    pub body: String,
    pub body_kind: Option<String>,
    pub system: String,
    pub sector: String,
}

impl SurveyStore {
    /// Find resources matching every filter of `query`
    pub fn search(&self, query: &ResourceQuery) -> Result<Vec<ResourceHit>> {
        let (where_clause, values) = query.where_clause()?;
        let sql = format!(
            "SELECT resources.name, resources.tl, resources.quality, resources.prevalence,
                    resources.zone, bodies.name, bodies.body_kind,
                    surveys.system_name, surveys.sector_name
             FROM resources
             JOIN bodies ON resources.body_id = bodies.id
             JOIN surveys ON resources.survey_id = surveys.id
             {}
             ORDER BY resources.name ASC, resources.quality DESC",
            where_clause
        );

        let mut stmt = self
            .connection()
            .prepare(&sql)
            .map_err(|e| Error::storage("Failed to prepare resource search", e))?;

        let hits = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(ResourceHit {
                    resource: row.get(0)?,
                    tech_level: row.get(1)?,
                    quality: row.get(2)?,
                    prevalence: row.get(3)?,
                    zone: row.get(4)?,
                    body: row.get(5)?,
                    body_kind: row.get(6)?,
                    system: row.get(7)?,
                    sector: row.get(8)?,
                })
            })
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| Error::storage("Failed to run resource search", e))?;

        Ok(hits)
    }
}
