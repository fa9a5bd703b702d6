use crate::config::DeletePolicy;
use crate::db::{activities, areas, clean_text, customers, normalize_key, notices};
use crate::error::ApiError;
use chrono::NaiveDate;
use common::model::interruption::{Interruption, InterruptionInput};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "interruption";
const COLUMNS: &str = "id, date, area, start_time, end_time, reason, affected_line, is_update";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Interruption> {
    Ok(Interruption {
        id: row.get(0)?,
        date: row.get(1)?,
        area: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        reason: row.get(5)?,
        affected_line: row.get(6)?,
        is_update: row.get(7)?,
    })
}

fn query_list(
    conn: &Connection,
    filter: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<Interruption>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM interruptions {filter} ORDER BY date, id"
    ))?;
    let rows = stmt
        .query_map(args, from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, id: i64) -> Result<Interruption, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM interruptions WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

pub fn list(conn: &Connection) -> Result<Vec<Interruption>, ApiError> {
    query_list(conn, "", [])
}

pub fn list_by_date(conn: &Connection, date: NaiveDate) -> Result<Vec<Interruption>, ApiError> {
    query_list(conn, "WHERE date = ?1", params![date])
}

pub fn list_by_area(conn: &Connection, area: &str) -> Result<Vec<Interruption>, ApiError> {
    query_list(conn, "WHERE area_key = ?1", params![normalize_key(area)])
}

/// Looks up an interruption by its natural key (date, normalized area).
pub fn find_by_key(
    conn: &Connection,
    date: NaiveDate,
    area: &str,
) -> Result<Option<Interruption>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM interruptions WHERE date = ?1 AND area_key = ?2"),
            params![date, normalize_key(area)],
            from_row,
        )
        .optional()?)
}

/// Inserts a row and returns its id. The raw `rusqlite` error is kept so the
/// reconciler can tell a lost insert race apart from other failures.
pub fn insert(conn: &Connection, input: &InterruptionInput) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO interruptions \
         (date, area, area_key, start_time, end_time, reason, affected_line, is_update) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.date,
            input.area.trim(),
            normalize_key(&input.area),
            input.start_time,
            input.end_time,
            clean_text(input.reason.as_deref()),
            clean_text(input.affected_line.as_deref()),
            input.is_update,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create(conn: &Connection, input: &InterruptionInput) -> Result<Interruption, ApiError> {
    let id = insert(conn, input)?;
    get(conn, id)
}

/// Replaces every field, natural key included.
pub fn update(
    conn: &Connection,
    id: i64,
    input: &InterruptionInput,
) -> Result<Interruption, ApiError> {
    let changed = conn.execute(
        "UPDATE interruptions SET date = ?1, area = ?2, area_key = ?3, start_time = ?4, \
         end_time = ?5, reason = ?6, affected_line = ?7, is_update = ?8 WHERE id = ?9",
        params![
            input.date,
            input.area.trim(),
            normalize_key(&input.area),
            input.start_time,
            input.end_time,
            clean_text(input.reason.as_deref()),
            clean_text(input.affected_line.as_deref()),
            input.is_update,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(ApiError::NotFound { entity: ENTITY, id });
    }
    get(conn, id)
}

/// Rewrites the attributes outside the natural key.
pub fn update_details(
    conn: &Connection,
    id: i64,
    input: &InterruptionInput,
) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE interruptions SET start_time = ?1, end_time = ?2, reason = ?3, \
         affected_line = ?4, is_update = ?5 WHERE id = ?6",
        params![
            input.start_time,
            input.end_time,
            clean_text(input.reason.as_deref()),
            clean_text(input.affected_line.as_deref()),
            input.is_update,
            id,
        ],
    )?;
    Ok(())
}

/// True when `row` already carries every attribute of `input` outside the natural key.
pub fn details_match(row: &Interruption, input: &InterruptionInput) -> bool {
    row.start_time == input.start_time
        && row.end_time == input.end_time
        && row.reason == clean_text(input.reason.as_deref())
        && row.affected_line == clean_text(input.affected_line.as_deref())
        && row.is_update == input.is_update
}

/// Rows listed directly on an interruption, besides its notices.
fn direct_dependent_count(conn: &Connection, id: i64) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT (SELECT COUNT(*) FROM affected_customers WHERE interruption_id = ?1) \
              + (SELECT COUNT(*) FROM specific_activities WHERE interruption_id = ?1) \
              + (SELECT COUNT(*) FROM affected_areas WHERE interruption_id = ?1)",
        params![id],
        |row| row.get(0),
    )?)
}

/// Deletes an interruption, honouring `policy` when notices, areas or
/// directly listed customers and activities still refer to it.
pub fn delete(conn: &mut Connection, id: i64, policy: DeletePolicy) -> Result<(), ApiError> {
    let tx = conn.transaction()?;
    get(&tx, id)?;

    let notice_ids = notices::ids_for_interruption(&tx, id)?;
    let direct = direct_dependent_count(&tx, id)?;
    if !notice_ids.is_empty() || direct > 0 {
        match policy {
            DeletePolicy::Reject => {
                return Err(ApiError::HasDependents { entity: ENTITY, id });
            }
            DeletePolicy::Cascade => {
                for notice_id in &notice_ids {
                    notices::delete_tree(&tx, *notice_id)?;
                }
                customers::delete_for_interruption(&tx, id)?;
                activities::delete_for_interruption(&tx, id)?;
                areas::delete_for_interruption(&tx, id)?;
                info!(
                    "Cascading delete of interruption {} removed {} notice(s) and {} direct row(s)",
                    id,
                    notice_ids.len(),
                    direct
                );
            }
        }
    }

    tx.execute("DELETE FROM interruptions WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(())
}
