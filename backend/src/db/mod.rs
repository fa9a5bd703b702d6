//! SQLite storage layer.
//!
//! [`Database`] is the storage handle threaded through the application: it
//! knows where the file lives and how long statements may wait on a lock.
//! Each operation opens its own [`Connection`] with foreign keys enforced, so
//! the handle is cheap to clone into blocking tasks.
//!
//! The table modules expose plain functions over `&Connection`. A
//! `rusqlite::Transaction` derefs to `Connection`, so the same functions run
//! inside the import's per-entry transactions.

pub mod activities;
pub mod areas;
pub mod barangays;
pub mod customers;
pub mod interruptions;
pub mod notices;
pub mod personnel;

use crate::error::ApiError;
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Opens (creating if needed) the database file and brings the schema
    /// up to [`SCHEMA_VERSION`].
    pub fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self, ApiError> {
        let db = Self {
            path: path.into(),
            busy_timeout,
        };
        if let Some(parent) = db.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = db.connect()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        migrate(&conn)?;
        info!("Database ready at {}", db.path.display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh connection with foreign keys and the busy timeout applied.
    pub fn connect(&self) -> Result<Connection, ApiError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    /// Runs `f` on a fresh connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut conn = self.connect()?;
        f(&mut conn)
    }
}

fn schema_version(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn migrate(conn: &Connection) -> Result<(), ApiError> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(ApiError::Config(format!(
            "database schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }

    if current < 1 {
        conn.execute_batch(include_str!("../../migrations/0001_initial_schema.sql"))?;
        conn.pragma_update(None, "user_version", 1)?;
        info!("Applied migration 0001_initial_schema");
    }

    Ok(())
}

/// Lowercased, trimmed, whitespace-collapsed form of a text key.
///
/// Stored next to the display text in the `*_key` columns; unique indexes
/// and lookups use this form only.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trimmed optional text; empty and whitespace-only values read as `None`.
///
/// Every write of an optional text column goes through here, so a row reads
/// back the same whether it arrived through the API or an import.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// The row a customer or activity is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Notice(i64),
    Interruption(i64),
}

impl Owner {
    /// Exactly one of the two ids must be given.
    pub fn from_ids(
        notice_id: Option<i64>,
        interruption_id: Option<i64>,
    ) -> Result<Self, ApiError> {
        match (notice_id, interruption_id) {
            (Some(id), None) => Ok(Owner::Notice(id)),
            (None, Some(id)) => Ok(Owner::Interruption(id)),
            _ => Err(ApiError::Validation(
                "exactly one of 'notice_id' and 'interruption_id' is required".to_string(),
            )),
        }
    }

    /// `(notice_id, interruption_id)` column values.
    pub fn columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            Owner::Notice(id) => (Some(id), None),
            Owner::Interruption(id) => (None, Some(id)),
        }
    }

    /// Fails with a conflict when the owning row does not exist.
    pub(crate) fn ensure_exists(self, conn: &Connection, child: &str) -> Result<(), ApiError> {
        let found = match self {
            Owner::Notice(id) => notices::get(conn, id).map(|_| ()),
            Owner::Interruption(id) => interruptions::get(conn, id).map(|_| ()),
        };
        match found {
            Err(ApiError::NotFound { entity, id }) => Err(ApiError::Conflict(format!(
                "{} refers to missing {} {}",
                child, entity, id
            ))),
            other => other,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_applies_schema_once() {
        let (_dir, db) = testing::temp_database();
        let conn = db.connect().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // reopening is a no-op
        let again = Database::open(db.path(), Duration::from_millis(500)).unwrap();
        let conn = again.connect().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('interruptions', 'notices', 'affected_customers', 'specific_activities', \
                  'personnel', 'affected_areas', 'barangays')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 7);
    }

    #[test]
    fn newer_schema_is_refused() {
        let (_dir, db) = testing::temp_database();
        db.connect()
            .unwrap()
            .pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        let err = Database::open(db.path(), Duration::from_millis(500)).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let (_dir, db) = testing::temp_database();
        let conn = db.connect().unwrap();
        let err = conn
            .execute(
                "INSERT INTO notices (interruption_id, area, area_key) VALUES (999, 'x', 'x')",
                [],
            )
            .unwrap_err();
        assert_eq!(ApiError::from(err).kind(), "conflict");
    }

    #[test]
    fn keys_ignore_case_and_spacing() {
        assert_eq!(normalize_key("  Zone   A "), "zone a");
        assert_eq!(normalize_key("ZONE\tA"), normalize_key("zone a"));
        assert_eq!(normalize_key("Juan Dela Cruz"), "juan dela cruz");
    }

    #[test]
    fn blank_optional_text_is_dropped() {
        assert_eq!(clean_text(Some("  Maintenance ")), Some("Maintenance".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(Some("")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn owner_needs_exactly_one_id() {
        assert_eq!(Owner::from_ids(Some(3), None).unwrap(), Owner::Notice(3));
        assert_eq!(Owner::from_ids(None, Some(4)).unwrap().columns(), (None, Some(4)));
        assert!(matches!(Owner::from_ids(None, None), Err(ApiError::Validation(_))));
        assert!(matches!(Owner::from_ids(Some(1), Some(2)), Err(ApiError::Validation(_))));
    }
}
