use crate::db::{normalize_key, Owner};
use crate::error::ApiError;
use common::model::activity::{ActivityInput, SpecificActivity};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "activity";
const COLUMNS: &str = "id, notice_id, interruption_id, description";

fn from_row(row: &Row<'_>) -> rusqlite::Result<SpecificActivity> {
    Ok(SpecificActivity {
        id: row.get(0)?,
        notice_id: row.get(1)?,
        interruption_id: row.get(2)?,
        description: row.get(3)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<SpecificActivity, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM specific_activities WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

/// Lists activities, optionally narrowed to a notice and/or to those listed
/// directly on an interruption.
pub fn list(
    conn: &Connection,
    notice_id: Option<i64>,
    interruption_id: Option<i64>,
) -> Result<Vec<SpecificActivity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM specific_activities \
         WHERE (?1 IS NULL OR notice_id = ?1) AND (?2 IS NULL OR interruption_id = ?2) \
         ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(params![notice_id, interruption_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_key(
    conn: &Connection,
    owner: Owner,
    description: &str,
) -> Result<Option<SpecificActivity>, ApiError> {
    let (notice_id, interruption_id) = owner.columns();
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM specific_activities \
                 WHERE notice_id IS ?1 AND interruption_id IS ?2 AND description_key = ?3"
            ),
            params![notice_id, interruption_id, normalize_key(description)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, owner: Owner, description: &str) -> rusqlite::Result<i64> {
    let (notice_id, interruption_id) = owner.columns();
    conn.execute(
        "INSERT INTO specific_activities \
         (notice_id, interruption_id, description, description_key) VALUES (?1, ?2, ?3, ?4)",
        params![notice_id, interruption_id, description.trim(), normalize_key(description)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create(conn: &Connection, input: &ActivityInput) -> Result<SpecificActivity, ApiError> {
    let owner = Owner::from_ids(input.notice_id, input.interruption_id)?;
    owner.ensure_exists(conn, ENTITY)?;
    let id = insert(conn, owner, &input.description)?;
    get(conn, id)
}

pub fn update(
    conn: &Connection,
    id: i64,
    input: &ActivityInput,
) -> Result<SpecificActivity, ApiError> {
    get(conn, id)?;
    let owner = Owner::from_ids(input.notice_id, input.interruption_id)?;
    owner.ensure_exists(conn, ENTITY)?;
    let (notice_id, interruption_id) = owner.columns();
    conn.execute(
        "UPDATE specific_activities SET notice_id = ?1, interruption_id = ?2, description = ?3, \
         description_key = ?4 WHERE id = ?5",
        params![
            notice_id,
            interruption_id,
            input.description.trim(),
            normalize_key(&input.description),
            id
        ],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), ApiError> {
    let removed = conn.execute("DELETE FROM specific_activities WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(ApiError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}

pub(crate) fn delete_for_notice(conn: &Connection, notice_id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "DELETE FROM specific_activities WHERE notice_id = ?1",
        params![notice_id],
    )?)
}

pub(crate) fn delete_for_interruption(
    conn: &Connection,
    interruption_id: i64,
) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "DELETE FROM specific_activities WHERE interruption_id = ?1",
        params![interruption_id],
    )?)
}
