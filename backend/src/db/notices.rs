use crate::config::DeletePolicy;
use crate::db::{activities, clean_text, customers, interruptions, normalize_key, personnel};
use crate::error::ApiError;
use common::model::notice::{Notice, NoticeInput};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "notice";
const COLUMNS: &str = "id, interruption_id, area, control_no, date_issued, body";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Notice> {
    Ok(Notice {
        id: row.get(0)?,
        interruption_id: row.get(1)?,
        area: row.get(2)?,
        control_no: row.get(3)?,
        date_issued: row.get(4)?,
        body: row.get(5)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Notice, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM notices WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

pub fn list(conn: &Connection, interruption_id: Option<i64>) -> Result<Vec<Notice>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM notices \
         WHERE ?1 IS NULL OR interruption_id = ?1 ORDER BY interruption_id, id"
    ))?;
    let rows = stmt
        .query_map(params![interruption_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn ids_for_interruption(conn: &Connection, interruption_id: i64) -> Result<Vec<i64>, ApiError> {
    let mut stmt = conn.prepare("SELECT id FROM notices WHERE interruption_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map(params![interruption_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// Looks up a notice by (parent interruption, normalized area).
pub fn find_by_key(
    conn: &Connection,
    interruption_id: i64,
    area: &str,
) -> Result<Option<Notice>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM notices WHERE interruption_id = ?1 AND area_key = ?2"),
            params![interruption_id, normalize_key(area)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, input: &NoticeInput) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO notices (interruption_id, area, area_key, control_no, date_issued, body) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.interruption_id,
            input.area.trim(),
            normalize_key(&input.area),
            clean_text(input.control_no.as_deref()),
            input.date_issued,
            clean_text(input.body.as_deref()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The parent must exist; a dangling id is a conflict, not a 404 on the notice.
fn ensure_parent(conn: &Connection, interruption_id: i64) -> Result<(), ApiError> {
    match interruptions::get(conn, interruption_id) {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound { .. }) => Err(ApiError::Conflict(format!(
            "notice refers to missing interruption {}",
            interruption_id
        ))),
        Err(e) => Err(e),
    }
}

pub fn create(conn: &Connection, input: &NoticeInput) -> Result<Notice, ApiError> {
    ensure_parent(conn, input.interruption_id)?;
    let id = insert(conn, input)?;
    get(conn, id)
}

pub fn update(conn: &Connection, id: i64, input: &NoticeInput) -> Result<Notice, ApiError> {
    get(conn, id)?;
    ensure_parent(conn, input.interruption_id)?;
    conn.execute(
        "UPDATE notices SET interruption_id = ?1, area = ?2, area_key = ?3, control_no = ?4, \
         date_issued = ?5, body = ?6 WHERE id = ?7",
        params![
            input.interruption_id,
            input.area.trim(),
            normalize_key(&input.area),
            clean_text(input.control_no.as_deref()),
            input.date_issued,
            clean_text(input.body.as_deref()),
            id,
        ],
    )?;
    get(conn, id)
}

pub fn update_details(conn: &Connection, id: i64, input: &NoticeInput) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE notices SET control_no = ?1, date_issued = ?2, body = ?3 WHERE id = ?4",
        params![
            clean_text(input.control_no.as_deref()),
            input.date_issued,
            clean_text(input.body.as_deref()),
            id
        ],
    )?;
    Ok(())
}

pub fn details_match(row: &Notice, input: &NoticeInput) -> bool {
    row.control_no == clean_text(input.control_no.as_deref())
        && row.date_issued == input.date_issued
        && row.body == clean_text(input.body.as_deref())
}

fn dependent_count(conn: &Connection, id: i64) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT (SELECT COUNT(*) FROM affected_customers WHERE notice_id = ?1) \
              + (SELECT COUNT(*) FROM specific_activities WHERE notice_id = ?1) \
              + (SELECT COUNT(*) FROM personnel WHERE notice_id = ?1)",
        params![id],
        |row| row.get(0),
    )?)
}

/// Removes a notice together with its customers, activities and personnel.
pub(crate) fn delete_tree(conn: &Connection, id: i64) -> Result<(), ApiError> {
    customers::delete_for_notice(conn, id)?;
    activities::delete_for_notice(conn, id)?;
    personnel::delete_for_notice(conn, id)?;
    conn.execute("DELETE FROM notices WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn delete(conn: &mut Connection, id: i64, policy: DeletePolicy) -> Result<(), ApiError> {
    let tx = conn.transaction()?;
    get(&tx, id)?;

    let dependents = dependent_count(&tx, id)?;
    if dependents > 0 && policy == DeletePolicy::Reject {
        return Err(ApiError::HasDependents { entity: ENTITY, id });
    }
    delete_tree(&tx, id)?;
    if dependents > 0 {
        info!("Cascading delete of notice {} removed {} child row(s)", id, dependents);
    }

    tx.commit()?;
    Ok(())
}
