use crate::config::DeletePolicy;
use crate::db::{barangays, interruptions, normalize_key};
use crate::error::ApiError;
use common::model::area::{AffectedArea, AreaInput};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "area";
const COLUMNS: &str = "id, interruption_id, name";

fn from_row(row: &Row<'_>) -> rusqlite::Result<AffectedArea> {
    Ok(AffectedArea {
        id: row.get(0)?,
        interruption_id: row.get(1)?,
        name: row.get(2)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<AffectedArea, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM affected_areas WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

pub fn list(conn: &Connection, interruption_id: Option<i64>) -> Result<Vec<AffectedArea>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM affected_areas \
         WHERE ?1 IS NULL OR interruption_id = ?1 ORDER BY interruption_id, id"
    ))?;
    let rows = stmt
        .query_map(params![interruption_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_key(
    conn: &Connection,
    interruption_id: i64,
    name: &str,
) -> Result<Option<AffectedArea>, ApiError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM affected_areas WHERE interruption_id = ?1 AND name_key = ?2"
            ),
            params![interruption_id, normalize_key(name)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, interruption_id: i64, name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO affected_areas (interruption_id, name, name_key) VALUES (?1, ?2, ?3)",
        params![interruption_id, name.trim(), normalize_key(name)],
    )?;
    Ok(conn.last_insert_rowid())
}

fn ensure_parent(conn: &Connection, interruption_id: i64) -> Result<(), ApiError> {
    match interruptions::get(conn, interruption_id) {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound { .. }) => Err(ApiError::Conflict(format!(
            "area refers to missing interruption {}",
            interruption_id
        ))),
        Err(e) => Err(e),
    }
}

pub fn create(conn: &Connection, input: &AreaInput) -> Result<AffectedArea, ApiError> {
    ensure_parent(conn, input.interruption_id)?;
    let id = insert(conn, input.interruption_id, &input.name)?;
    get(conn, id)
}

pub fn update(conn: &Connection, id: i64, input: &AreaInput) -> Result<AffectedArea, ApiError> {
    get(conn, id)?;
    ensure_parent(conn, input.interruption_id)?;
    conn.execute(
        "UPDATE affected_areas SET interruption_id = ?1, name = ?2, name_key = ?3 WHERE id = ?4",
        params![
            input.interruption_id,
            input.name.trim(),
            normalize_key(&input.name),
            id
        ],
    )?;
    get(conn, id)
}

/// Deletes an area; its barangays follow `policy`.
pub fn delete(conn: &mut Connection, id: i64, policy: DeletePolicy) -> Result<(), ApiError> {
    let tx = conn.transaction()?;
    get(&tx, id)?;

    let children = barangays::list(&tx, Some(id))?.len();
    if children > 0 && policy == DeletePolicy::Reject {
        return Err(ApiError::HasDependents { entity: ENTITY, id });
    }
    barangays::delete_for_area(&tx, id)?;
    tx.execute("DELETE FROM affected_areas WHERE id = ?1", params![id])?;
    if children > 0 {
        info!("Cascading delete of area {} removed {} barangay(s)", id, children);
    }

    tx.commit()?;
    Ok(())
}

/// Removes every area of an interruption together with their barangays.
pub(crate) fn delete_for_interruption(
    conn: &Connection,
    interruption_id: i64,
) -> Result<usize, ApiError> {
    conn.execute(
        "DELETE FROM barangays WHERE area_id IN \
         (SELECT id FROM affected_areas WHERE interruption_id = ?1)",
        params![interruption_id],
    )?;
    Ok(conn.execute(
        "DELETE FROM affected_areas WHERE interruption_id = ?1",
        params![interruption_id],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;
    use chrono::NaiveDate;
    use common::model::interruption::InterruptionInput;

    #[test]
    fn area_with_barangays_depends_on_policy() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();
        let interruption = interruptions::create(
            &conn,
            &InterruptionInput {
                date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                area: "Batangas City".to_string(),
                start_time: None,
                end_time: None,
                reason: None,
                affected_line: None,
                is_update: false,
            },
        )
        .unwrap();
        let area = create(
            &conn,
            &AreaInput {
                interruption_id: interruption.id,
                name: " Batangas City".to_string(),
            },
        )
        .unwrap();
        assert_eq!(area.name, "Batangas City");
        barangays::insert(&conn, area.id, "Alangilan").unwrap();

        let err = delete(&mut conn, area.id, DeletePolicy::Reject).unwrap_err();
        assert!(matches!(err, ApiError::HasDependents { entity: "area", .. }));

        delete(&mut conn, area.id, DeletePolicy::Cascade).unwrap();
        assert!(list(&conn, Some(interruption.id)).unwrap().is_empty());
        assert!(barangays::list(&conn, None).unwrap().is_empty());
    }
}
