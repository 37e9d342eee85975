// src/installed/db.rs

//! SQLite-backed installed state
//!
//! One row per installed spec, keyed by (name, version, platform). The
//! schema is versioned so later columns can be added by migration.

use crate::error::{Error, Result};
use crate::spec::{Platform, Specification};
use crate::version::Version;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, info};

use super::InstalledSpecs;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Installed specifications stored in SQLite
pub struct InstalledDb {
    conn: Connection,
}

impl InstalledDb {
    /// Open (creating if needed) the database at `path` and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Record `spec` as installed; recording it twice is a no-op
    pub fn record(&self, spec: &Specification) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO installed_specs (name, version, platform) VALUES (?1, ?2, ?3)",
            params![spec.name, spec.version.to_string(), spec.platform.to_string()],
        )?;
        debug!("Recorded {} as installed", spec.full_name());
        Ok(())
    }

    /// Returns whether a row was removed
    pub fn remove(&self, spec: &Specification) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM installed_specs WHERE name = ?1 AND version = ?2 AND platform = ?3",
            params![spec.name, spec.version.to_string(), spec.platform.to_string()],
        )?;
        Ok(removed > 0)
    }

    /// All installed specs, ordered by name then insertion
    pub fn list(&self) -> Result<Vec<Specification>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, version, platform FROM installed_specs ORDER BY name, id")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut specs = Vec::new();
        for row in rows {
            let (name, version, platform) = row?;
            let version = Version::parse(&version)?;
            specs.push(Specification::new(name, version).with_platform(Platform::parse(&platform)));
        }
        Ok(specs)
    }
}

impl InstalledSpecs for InstalledDb {
    fn contains(&self, spec: &Specification) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM installed_specs WHERE name = ?1 AND version = ?2 AND platform = ?3",
                params![spec.name, spec.version.to_string(), spec.platform.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?
        .unwrap_or(0);

    Ok(version)
}

/// Apply all pending migrations
fn migrate(conn: &Connection) -> Result<()> {
    let current = get_schema_version(conn)?;
    if current >= SCHEMA_VERSION {
        debug!("Installed-state schema is up to date (version {})", current);
        return Ok(());
    }

    for version in (current + 1)..=SCHEMA_VERSION {
        info!("Applying installed-state migration to version {}", version);
        match version {
            1 => migrate_v1(conn)?,
            other => {
                return Err(Error::InitError(format!(
                    "Unknown schema migration version: {other}"
                )));
            }
        }
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    }
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS installed_specs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            version TEXT NOT NULL,
            platform TEXT NOT NULL DEFAULT 'any',
            installed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(name, version, platform)
        );
        CREATE INDEX IF NOT EXISTS idx_installed_specs_name ON installed_specs(name);",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, version: &str) -> Specification {
        Specification::parse(name, version).unwrap()
    }

    #[test]
    fn test_record_and_contains() {
        let db = InstalledDb::open_in_memory().unwrap();
        let rake = spec("rake", "13.1.0");

        assert!(!db.contains(&rake).unwrap());
        db.record(&rake).unwrap();
        db.record(&rake).unwrap();

        assert!(db.contains(&rake).unwrap());
        assert!(!db.contains(&spec("rake", "13.0.6")).unwrap());
        assert_eq!(db.list().unwrap(), vec![rake]);
    }

    #[test]
    fn test_platform_is_part_of_identity() {
        let db = InstalledDb::open_in_memory().unwrap();
        let native = spec("nokogiri", "1.15.5")
            .with_platform(Platform::Named("x86_64-linux".to_string()));

        db.record(&native).unwrap();
        assert!(db.contains(&native).unwrap());
        assert!(!db.contains(&spec("nokogiri", "1.15.5")).unwrap());
        assert_eq!(db.list().unwrap()[0].platform, native.platform);
    }

    #[test]
    fn test_remove() {
        let db = InstalledDb::open_in_memory().unwrap();
        let rack = spec("rack", "3.0.8");
        db.record(&rack).unwrap();

        assert!(db.remove(&rack).unwrap());
        assert!(!db.remove(&rack).unwrap());
        assert!(db.list().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_keeps_state_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("installed.db");

        {
            let db = InstalledDb::open(&path).unwrap();
            db.record(&spec("json", "2.7.1")).unwrap();
        }

        let db = InstalledDb::open(&path).unwrap();
        assert!(db.contains(&spec("json", "2.7.1")).unwrap());
        assert_eq!(get_schema_version(&db.conn).unwrap(), SCHEMA_VERSION);
    }
}
