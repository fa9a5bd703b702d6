use crate::db::{normalize_key, notices};
use crate::error::ApiError;
use common::model::personnel::{Personnel, PersonnelInput};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "personnel";
const COLUMNS: &str = "id, notice_id, name, position";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Personnel> {
    Ok(Personnel {
        id: row.get(0)?,
        notice_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Personnel, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM personnel WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

pub fn list(conn: &Connection, notice_id: Option<i64>) -> Result<Vec<Personnel>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM personnel WHERE ?1 IS NULL OR notice_id = ?1 ORDER BY notice_id, id"
    ))?;
    let rows = stmt
        .query_map(params![notice_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Personnel are matched by name within a notice; the position may change.
pub fn find_by_key(
    conn: &Connection,
    notice_id: i64,
    name: &str,
) -> Result<Option<Personnel>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM personnel WHERE notice_id = ?1 AND name_key = ?2"),
            params![notice_id, normalize_key(name)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, notice_id: i64, name: &str, position: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO personnel (notice_id, name, name_key, position) VALUES (?1, ?2, ?3, ?4)",
        params![notice_id, name.trim(), normalize_key(name), position.trim()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_position(conn: &Connection, id: i64, position: &str) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE personnel SET position = ?1 WHERE id = ?2",
        params![position.trim(), id],
    )?;
    Ok(())
}

fn ensure_parent(conn: &Connection, notice_id: i64) -> Result<(), ApiError> {
    match notices::get(conn, notice_id) {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound { .. }) => Err(ApiError::Conflict(format!(
            "personnel refers to missing notice {}",
            notice_id
        ))),
        Err(e) => Err(e),
    }
}

pub fn create(conn: &Connection, input: &PersonnelInput) -> Result<Personnel, ApiError> {
    ensure_parent(conn, input.notice_id)?;
    let id = insert(conn, input.notice_id, &input.name, &input.position)?;
    get(conn, id)
}

pub fn update(conn: &Connection, id: i64, input: &PersonnelInput) -> Result<Personnel, ApiError> {
    get(conn, id)?;
    ensure_parent(conn, input.notice_id)?;
    conn.execute(
        "UPDATE personnel SET notice_id = ?1, name = ?2, name_key = ?3, position = ?4 WHERE id = ?5",
        params![
            input.notice_id,
            input.name.trim(),
            normalize_key(&input.name),
            input.position.trim(),
            id
        ],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), ApiError> {
    let removed = conn.execute("DELETE FROM personnel WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(ApiError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}

pub(crate) fn delete_for_notice(conn: &Connection, notice_id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM personnel WHERE notice_id = ?1", params![notice_id])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{interruptions, testing::temp_database};
    use chrono::NaiveDate;
    use common::model::interruption::InterruptionInput;
    use common::model::notice::NoticeInput;

    #[test]
    fn personnel_are_keyed_by_name_within_a_notice() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        let interruption = interruptions::create(
            &conn,
            &InterruptionInput {
                date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                area: "Rosario".to_string(),
                start_time: None,
                end_time: None,
                reason: None,
                affected_line: None,
                is_update: false,
            },
        )
        .unwrap();
        let notice = notices::create(
            &conn,
            &NoticeInput {
                interruption_id: interruption.id,
                area: "Rosario".to_string(),
                control_no: None,
                date_issued: None,
                body: None,
            },
        )
        .unwrap();

        let created = create(
            &conn,
            &PersonnelInput {
                notice_id: notice.id,
                name: "Maria Santos".to_string(),
                position: "Area Engineer".to_string(),
            },
        )
        .unwrap();
        update_position(&conn, created.id, "District Manager").unwrap();

        let found = find_by_key(&conn, notice.id, "MARIA SANTOS").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.position, "District Manager");

        delete(&conn, created.id).unwrap();
        assert!(matches!(
            delete(&conn, created.id),
            Err(ApiError::NotFound { entity: "personnel", .. })
        ));
    }
}
