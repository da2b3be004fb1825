//! SQLite survey store
//!
//! Parsed systems are stored one survey per system, keyed by the system's
//! universal coordinates. Saving a survey of an already stored system keeps
//! whichever survey is more recent. Resource search lives in [`query`].

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;
use tracing::{debug, info};

use crate::app::models::System;
use crate::{Error, Result};

pub mod query;

#[cfg(test)]
pub mod tests;

pub use query::{ResourceHit, ResourceQuery, SectorRegion};

const TABLES: [&str; 4] = ["surveys", "wormholes", "bodies", "resources"];

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS surveys (
        id          INTEGER PRIMARY KEY,
        survey_date INTEGER,
        stored_date INTEGER NOT NULL,
        system_name TEXT NOT NULL,
        system_id   TEXT NOT NULL,
        sector_name TEXT NOT NULL,
        sector_id   TEXT NOT NULL,
        sector_x    REAL NOT NULL,
        sector_y    REAL NOT NULL,
        sector_z    REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS wormholes (
        polarity    TEXT NOT NULL,
        source_id   TEXT NOT NULL,
        dest_id     TEXT NOT NULL,
        dest_name   TEXT NOT NULL,
        dest_sector TEXT NOT NULL,
        survey_id   INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS bodies (
        id             INTEGER PRIMARY KEY,
        name           TEXT NOT NULL,
        body_kind      TEXT,
        star_type      TEXT,
        spectral_class TEXT,
        star_size      TEXT,
        diameter       TEXT,
        orbits         TEXT,
        orbit_zone     TEXT,
        num_zones      INTEGER NOT NULL,
        survey_id      INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS resources (
        name       TEXT NOT NULL,
        quality    INTEGER NOT NULL,
        prevalence INTEGER NOT NULL,
        tl         INTEGER NOT NULL,
        zone       INTEGER NOT NULL,
        body_id    INTEGER NOT NULL,
        survey_id  INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_surveys_system ON surveys(system_id);
    CREATE INDEX IF NOT EXISTS idx_resources_survey ON resources(survey_id);
    CREATE INDEX IF NOT EXISTS idx_resources_name ON resources(name);
"#;

/// Result of saving one survey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No survey of this system was stored
    Inserted,
    /// An older survey of this system was replaced
    Replaced,
    /// A newer survey of this system is already stored; nothing changed
    Stale,
}

/// Destination for parsed systems
pub trait SurveySink {
    fn save(&mut self, system: &System) -> Result<SaveOutcome>;
}

/// Survey database
#[derive(Debug)]
pub struct SurveyStore {
    conn: Connection,
}

impl SurveyStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::storage(format!("Failed to open database {}", path.display()), e)
        })?;
        debug!("Opened survey database {}", path.display());
        Self::with_connection(conn)
    }

    /// Create a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage("Failed to create in-memory database", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|e| Error::storage("Failed to initialize database schema", e))
    }

    /// Drop every table and recreate the empty schema
    pub fn clear(&mut self) -> Result<()> {
        for table in TABLES {
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", table), [])
                .map_err(|e| Error::storage(format!("Failed to drop table {}", table), e))?;
        }
        self.init_schema()?;
        info!("Cleared survey database");
        Ok(())
    }

    /// Number of stored surveys
    pub fn survey_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM surveys", [], |row| row.get(0))
            .map_err(|e| Error::storage("Failed to count surveys", e))?;
        Ok(count as usize)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SurveySink for SurveyStore {
    fn save(&mut self, system: &System) -> Result<SaveOutcome> {
        let system_id = system.location.universal_coords().to_string();
        let survey_date = system.scan_date.map(|date| date.timestamp());

        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::storage("Failed to start transaction", e))?;

        let existing: Option<(i64, Option<i64>)> = tx
            .query_row(
                "SELECT id, survey_date FROM surveys WHERE system_id = ?1
                 ORDER BY survey_date DESC LIMIT 1",
                params![system_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| Error::storage(format!("Failed to look up survey {}", system_id), e))?;

        // A missing date sorts before any dated survey
        if let Some((_, stored_date)) = existing {
            if survey_date < stored_date {
                debug!(
                    "Keeping newer stored survey of {}",
                    system.location.system_name()
                );
                return Ok(SaveOutcome::Stale);
            }
        }

        let mut replaced = false;
        let stale_ids: Vec<i64> = {
            let mut stmt = tx
                .prepare("SELECT id FROM surveys WHERE system_id = ?1")
                .map_err(|e| Error::storage("Failed to prepare survey lookup", e))?;
            stmt.query_map(params![system_id], |row| row.get(0))
                .and_then(|rows| rows.collect())
                .map_err(|e| Error::storage("Failed to list stored surveys", e))?
        };
        for survey_id in stale_ids {
            delete_survey(&tx, survey_id)?;
            replaced = true;
        }

        insert_survey(&tx, system, &system_id, survey_date)?;
        tx.commit()
            .map_err(|e| Error::storage("Failed to commit survey", e))?;

        let outcome = if replaced {
            SaveOutcome::Replaced
        } else {
            SaveOutcome::Inserted
        };
        info!(
            "Saved survey of {} ({:?}, {} bodies)",
            system.location.system_name(),
            outcome,
            system.bodies.len()
        );
        Ok(outcome)
    }
}

fn delete_survey(tx: &Transaction<'_>, survey_id: i64) -> Result<()> {
    for table in ["wormholes", "bodies", "resources"] {
        tx.execute(
            &format!("DELETE FROM {} WHERE survey_id = ?1", table),
            params![survey_id],
        )
        .map_err(|e| Error::storage(format!("Failed to delete from {}", table), e))?;
    }
    tx.execute("DELETE FROM surveys WHERE id = ?1", params![survey_id])
        .map_err(|e| Error::storage("Failed to delete survey", e))?;
    Ok(())
}

fn insert_survey(
    tx: &Transaction<'_>,
    system: &System,
    system_id: &str,
    survey_date: Option<i64>,
) -> Result<()> {
    let location = &system.location;
    let sector = location.sector_coords();

    tx.execute(
        "INSERT INTO surveys (survey_date, stored_date, system_name, system_id,
                              sector_name, sector_id, sector_x, sector_y, sector_z)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            survey_date,
            Utc::now().timestamp(),
            location.system_name(),
            system_id,
            location.sector_name(),
            sector.to_string(),
            sector.x,
            sector.y,
            sector.z
        ],
    )
    .map_err(|e| Error::storage("Failed to insert survey", e))?;
    let survey_id = tx.last_insert_rowid();

    for wormhole in &system.wormholes {
        tx.execute(
            "INSERT INTO wormholes (polarity, source_id, dest_id, dest_name, dest_sector, survey_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                wormhole.polarity.to_string(),
                wormhole.source.universal_coords().to_string(),
                wormhole.dest.universal_coords().to_string(),
                wormhole.dest.system_name(),
                wormhole.dest.sector_name(),
                survey_id
            ],
        )
        .map_err(|e| Error::storage("Failed to insert wormhole", e))?;
    }

    for body in &system.bodies {
        tx.execute(
            "INSERT INTO bodies (name, body_kind, star_type, spectral_class, star_size,
                                 diameter, orbits, orbit_zone, num_zones, survey_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                body.name,
                body.body_kind.as_ref().map(|kind| kind.to_string()),
                body.star_type,
                body.spectral_class,
                body.star_size,
                body.diameter,
                body.orbits,
                body.orbit_zone,
                body.zones().len() as i64,
                survey_id
            ],
        )
        .map_err(|e| Error::storage(format!("Failed to insert body {}", body.name), e))?;
        let body_id = tx.last_insert_rowid();

        for (zone, resources) in body.zones().iter().enumerate() {
            for resource in &resources.resources {
                tx.execute(
                    "INSERT INTO resources (name, quality, prevalence, tl, zone, body_id, survey_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        resource.name,
                        resource.quality,
                        resource.prevalence,
                        resource.tech_level(),
                        zone as i64,
                        body_id,
                        survey_id
                    ],
                )
                .map_err(|e| {
                    Error::storage(format!("Failed to insert resource {}", resource.name), e)
                })?;
            }
        }
    }

    Ok(())
}
