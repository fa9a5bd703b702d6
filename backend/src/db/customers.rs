use crate::db::{normalize_key, Owner};
use crate::error::ApiError;
use common::model::customer::{AffectedCustomer, CustomerInput};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "customer";
const COLUMNS: &str = "id, notice_id, interruption_id, name";

fn from_row(row: &Row<'_>) -> rusqlite::Result<AffectedCustomer> {
    Ok(AffectedCustomer {
        id: row.get(0)?,
        notice_id: row.get(1)?,
        interruption_id: row.get(2)?,
        name: row.get(3)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<AffectedCustomer, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM affected_customers WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(ApiError::NotFound { entity: ENTITY, id })
}

/// Lists customers, optionally narrowed to a notice and/or to those listed
/// directly on an interruption.
pub fn list(
    conn: &Connection,
    notice_id: Option<i64>,
    interruption_id: Option<i64>,
) -> Result<Vec<AffectedCustomer>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM affected_customers \
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
    name: &str,
) -> Result<Option<AffectedCustomer>, ApiError> {
    let (notice_id, interruption_id) = owner.columns();
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM affected_customers \
                 WHERE notice_id IS ?1 AND interruption_id IS ?2 AND name_key = ?3"
            ),
            params![notice_id, interruption_id, normalize_key(name)],
            from_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, owner: Owner, name: &str) -> rusqlite::Result<i64> {
    let (notice_id, interruption_id) = owner.columns();
    conn.execute(
        "INSERT INTO affected_customers (notice_id, interruption_id, name, name_key) \
         VALUES (?1, ?2, ?3, ?4)",
        params![notice_id, interruption_id, name.trim(), normalize_key(name)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create(conn: &Connection, input: &CustomerInput) -> Result<AffectedCustomer, ApiError> {
    let owner = Owner::from_ids(input.notice_id, input.interruption_id)?;
    owner.ensure_exists(conn, ENTITY)?;
    let id = insert(conn, owner, &input.name)?;
    get(conn, id)
}

pub fn update(
    conn: &Connection,
    id: i64,
    input: &CustomerInput,
) -> Result<AffectedCustomer, ApiError> {
    get(conn, id)?;
    let owner = Owner::from_ids(input.notice_id, input.interruption_id)?;
    owner.ensure_exists(conn, ENTITY)?;
    let (notice_id, interruption_id) = owner.columns();
    conn.execute(
        "UPDATE affected_customers SET notice_id = ?1, interruption_id = ?2, name = ?3, \
         name_key = ?4 WHERE id = ?5",
        params![
            notice_id,
            interruption_id,
            input.name.trim(),
            normalize_key(&input.name),
            id
        ],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), ApiError> {
    let removed = conn.execute("DELETE FROM affected_customers WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(ApiError::NotFound { entity: ENTITY, id });
    }
    Ok(())
}

pub(crate) fn delete_for_notice(conn: &Connection, notice_id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "DELETE FROM affected_customers WHERE notice_id = ?1",
        params![notice_id],
    )?)
}

pub(crate) fn delete_for_interruption(
    conn: &Connection,
    interruption_id: i64,
) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "DELETE FROM affected_customers WHERE interruption_id = ?1",
        params![interruption_id],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;
    use crate::db::{interruptions, notices};
    use chrono::NaiveDate;
    use common::model::interruption::InterruptionInput;
    use common::model::notice::NoticeInput;

    #[test]
    fn same_name_is_distinct_per_owner() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        let interruption = interruptions::create(
            &conn,
            &InterruptionInput {
                date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
                area: "Tanauan".to_string(),
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
                area: "Tanauan".to_string(),
                control_no: None,
                date_issued: None,
                body: None,
            },
        )
        .unwrap();

        let direct = create(
            &conn,
            &CustomerInput {
                notice_id: None,
                interruption_id: Some(interruption.id),
                name: "Acme Rice Mill".to_string(),
            },
        )
        .unwrap();
        let on_notice = create(
            &conn,
            &CustomerInput {
                notice_id: Some(notice.id),
                interruption_id: None,
                name: "acme rice mill".to_string(),
            },
        )
        .unwrap();
        assert_ne!(direct.id, on_notice.id);

        let found = find_by_key(&conn, Owner::Interruption(interruption.id), "ACME RICE MILL")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, direct.id);
        assert_eq!(list(&conn, None, Some(interruption.id)).unwrap().len(), 1);
        assert_eq!(list(&conn, Some(notice.id), None).unwrap().len(), 1);

        let err =
            insert(&conn, Owner::Interruption(interruption.id), " Acme  Rice Mill").unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }

    #[test]
    fn create_needs_exactly_one_existing_owner() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        let both = CustomerInput {
            notice_id: Some(1),
            interruption_id: Some(1),
            name: "Juan Dela Cruz".to_string(),
        };
        assert!(matches!(create(&conn, &both), Err(ApiError::Validation(_))));

        let dangling = CustomerInput {
            notice_id: None,
            interruption_id: Some(8),
            name: "Juan Dela Cruz".to_string(),
        };
        assert!(matches!(create(&conn, &dangling), Err(ApiError::Conflict(_))));
    }
}
