use crate::db::{areas, normalize_key};
use crate::error::ApiError;
use common::model::area::{Barangay, BarangayInput};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "barangay";
const COLUMNS: &str = "id, area_id, name";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Barangay> {
    Ok(Barangay {
        id: row.get(0)?,
        area_id: row.get(1)?,
        name: row.get(2)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Barangay, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM barangays WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

pub fn list(conn: &Connection, area_id: Option<i64>) -> Result<Vec<Barangay>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM barangays WHERE ?1 IS NULL OR area_id = ?1 ORDER BY area_id, id"
    ))?;
    let rows = stmt
        .query_map(params![area_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_key(conn: &Connection, area_id: i64, name: &str) -> Result<Option<Barangay>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM barangays WHERE area_id = ?1 AND name_key = ?2"),
            params![area_id, normalize_key(name)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, area_id: i64, name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO barangays (area_id, name, name_key) VALUES (?1, ?2, ?3)",
        params![area_id, name.trim(), normalize_key(name)],
    )?;
    Ok(conn.last_insert_rowid())
}

fn ensure_parent(conn: &Connection, area_id: i64) -> Result<(), ApiError> {
    match areas::get(conn, area_id) {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound { .. }) => Err(ApiError::Conflict(format!(
            "barangay refers to missing area {}",
            area_id
        ))),
        Err(e) => Err(e),
    }
}

pub fn create(conn: &Connection, input: &BarangayInput) -> Result<Barangay, ApiError> {
    ensure_parent(conn, input.area_id)?;
    let id = insert(conn, input.area_id, &input.name)?;
    get(conn, id)
}

pub fn update(conn: &Connection, id: i64, input: &BarangayInput) -> Result<Barangay, ApiError> {
    get(conn, id)?;
    ensure_parent(conn, input.area_id)?;
    conn.execute(
        "UPDATE barangays SET area_id = ?1, name = ?2, name_key = ?3 WHERE id = ?4",
        params![input.area_id, input.name.trim(), normalize_key(&input.name), id],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), ApiError> {
    let removed = conn.execute("DELETE FROM barangays WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(ApiError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}

pub(crate) fn delete_for_area(conn: &Connection, area_id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM barangays WHERE area_id = ?1", params![area_id])?)
}
