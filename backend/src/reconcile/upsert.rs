//! Lookup-then-upsert by natural key.
//!
//! Each entity kind describes how to find itself, insert itself, and whether
//! a stored row already carries its attributes. [`upsert`] turns that into
//! one of created / updated / unchanged, writing only when something changed.
//! An insert that loses a race against another writer (UNIQUE violation) is
//! resolved by looking the row up again and continuing as an update.

use crate::db::{activities, areas, barangays, customers, interruptions, notices, personnel, Owner};
use crate::error::{is_unique_violation, ApiError};
use common::model::document::{InterruptionRecord, NoticeRecord, PersonnelRecord};
use common::model::import::Outcome;
use common::model::interruption::InterruptionInput;
use common::model::notice::NoticeInput;
use log::debug;
use rusqlite::Connection;

pub(crate) trait NaturalKeyed {
    type Row;

    fn describe(&self) -> String;
    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError>;
    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64>;
    fn row_id(row: &Self::Row) -> i64;
    /// True when `row` already holds every attribute outside the natural key.
    fn is_current(&self, row: &Self::Row) -> bool;
    fn update(&self, conn: &Connection, row: &Self::Row) -> Result<(), ApiError>;
}

pub(crate) fn upsert<T: NaturalKeyed>(
    conn: &Connection,
    item: &T,
) -> Result<(i64, Outcome), ApiError> {
    if let Some(row) = item.find(conn)? {
        return refresh(conn, item, &row);
    }

    match item.insert(conn) {
        Ok(id) => Ok((id, Outcome::Created)),
        Err(err) if is_unique_violation(&err) => {
            debug!("Insert of {} raced another writer; updating instead", item.describe());
            match item.find(conn)? {
                Some(row) => refresh(conn, item, &row),
                None => Err(err.into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

fn refresh<T: NaturalKeyed>(
    conn: &Connection,
    item: &T,
    row: &T::Row,
) -> Result<(i64, Outcome), ApiError> {
    let id = T::row_id(row);
    if item.is_current(row) {
        return Ok((id, Outcome::Unchanged));
    }
    item.update(conn, row)?;
    Ok((id, Outcome::Updated))
}

pub(crate) struct InterruptionUpsert {
    input: InterruptionInput,
}

impl InterruptionUpsert {
    pub(crate) fn new(record: &InterruptionRecord) -> Self {
        Self {
            input: InterruptionInput {
                date: record.date,
                area: record.area.clone(),
                start_time: record.start_time,
                end_time: record.end_time,
                reason: record.reason.clone(),
                affected_line: record.affected_line.clone(),
                is_update: record.is_update,
            },
        }
    }
}

impl NaturalKeyed for InterruptionUpsert {
    type Row = common::model::interruption::Interruption;

    fn describe(&self) -> String {
        format!("interruption ({}, {})", self.input.date, self.input.area)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        interruptions::find_by_key(conn, self.input.date, &self.input.area)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        interruptions::insert(conn, &self.input)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, row: &Self::Row) -> bool {
        interruptions::details_match(row, &self.input)
    }

    fn update(&self, conn: &Connection, row: &Self::Row) -> Result<(), ApiError> {
        interruptions::update_details(conn, row.id, &self.input)
    }
}

pub(crate) struct NoticeUpsert {
    input: NoticeInput,
}

impl NoticeUpsert {
    pub(crate) fn new(interruption_id: i64, record: &NoticeRecord) -> Self {
        Self {
            input: NoticeInput {
                interruption_id,
                area: record.area.clone(),
                control_no: record.control_no.clone(),
                date_issued: record.date_issued,
                body: record.body.clone(),
            },
        }
    }
}

impl NaturalKeyed for NoticeUpsert {
    type Row = common::model::notice::Notice;

    fn describe(&self) -> String {
        format!(
            "notice ({}, {})",
            self.input.interruption_id, self.input.area
        )
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        notices::find_by_key(conn, self.input.interruption_id, &self.input.area)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        notices::insert(conn, &self.input)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, row: &Self::Row) -> bool {
        notices::details_match(row, &self.input)
    }

    fn update(&self, conn: &Connection, row: &Self::Row) -> Result<(), ApiError> {
        notices::update_details(conn, row.id, &self.input)
    }
}

/// Customers carry nothing besides their key: they are created or unchanged.
pub(crate) struct CustomerUpsert<'a> {
    pub(crate) owner: Owner,
    pub(crate) name: &'a str,
}

impl NaturalKeyed for CustomerUpsert<'_> {
    type Row = common::model::customer::AffectedCustomer;

    fn describe(&self) -> String {
        format!("customer ({:?}, {})", self.owner, self.name)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        customers::find_by_key(conn, self.owner, self.name)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        customers::insert(conn, self.owner, self.name)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, _row: &Self::Row) -> bool {
        true
    }

    fn update(&self, _conn: &Connection, _row: &Self::Row) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) struct ActivityUpsert<'a> {
    pub(crate) owner: Owner,
    pub(crate) description: &'a str,
}

impl NaturalKeyed for ActivityUpsert<'_> {
    type Row = common::model::activity::SpecificActivity;

    fn describe(&self) -> String {
        format!("activity ({:?}, {})", self.owner, self.description)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        activities::find_by_key(conn, self.owner, self.description)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        activities::insert(conn, self.owner, self.description)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, _row: &Self::Row) -> bool {
        true
    }

    fn update(&self, _conn: &Connection, _row: &Self::Row) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) struct AreaUpsert<'a> {
    pub(crate) interruption_id: i64,
    pub(crate) name: &'a str,
}

impl NaturalKeyed for AreaUpsert<'_> {
    type Row = common::model::area::AffectedArea;

    fn describe(&self) -> String {
        format!("area ({}, {})", self.interruption_id, self.name)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        areas::find_by_key(conn, self.interruption_id, self.name)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        areas::insert(conn, self.interruption_id, self.name)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, _row: &Self::Row) -> bool {
        true
    }

    fn update(&self, _conn: &Connection, _row: &Self::Row) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) struct BarangayUpsert<'a> {
    pub(crate) area_id: i64,
    pub(crate) name: &'a str,
}

impl NaturalKeyed for BarangayUpsert<'_> {
    type Row = common::model::area::Barangay;

    fn describe(&self) -> String {
        format!("barangay ({}, {})", self.area_id, self.name)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        barangays::find_by_key(conn, self.area_id, self.name)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        barangays::insert(conn, self.area_id, self.name)
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, _row: &Self::Row) -> bool {
        true
    }

    fn update(&self, _conn: &Connection, _row: &Self::Row) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) struct PersonnelUpsert<'a> {
    pub(crate) notice_id: i64,
    pub(crate) record: &'a PersonnelRecord,
}

impl NaturalKeyed for PersonnelUpsert<'_> {
    type Row = common::model::personnel::Personnel;

    fn describe(&self) -> String {
        format!("personnel ({}, {})", self.notice_id, self.record.name)
    }

    fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
        personnel::find_by_key(conn, self.notice_id, &self.record.name)
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        personnel::insert(
            conn,
            self.notice_id,
            &self.record.name,
            &self.record.position,
        )
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn is_current(&self, row: &Self::Row) -> bool {
        row.position == self.record.position.trim()
    }

    fn update(&self, conn: &Connection, row: &Self::Row) -> Result<(), ApiError> {
        personnel::update_position(conn, row.id, &self.record.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;
    use chrono::NaiveDate;

    /// Simulates a writer that committed the same key between our lookup and our insert.
    struct RacingCustomer<'a> {
        inner: CustomerUpsert<'a>,
        lookups: std::cell::Cell<u32>,
    }

    impl NaturalKeyed for RacingCustomer<'_> {
        type Row = common::model::customer::AffectedCustomer;

        fn describe(&self) -> String {
            self.inner.describe()
        }

        fn find(&self, conn: &Connection) -> Result<Option<Self::Row>, ApiError> {
            let seen = self.lookups.get();
            self.lookups.set(seen + 1);
            if seen == 0 {
                customers::insert(conn, self.inner.owner, self.inner.name)?;
                return Ok(None);
            }
            self.inner.find(conn)
        }

        fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
            self.inner.insert(conn)
        }

        fn row_id(row: &Self::Row) -> i64 {
            row.id
        }

        fn is_current(&self, row: &Self::Row) -> bool {
            self.inner.is_current(row)
        }

        fn update(&self, conn: &Connection, row: &Self::Row) -> Result<(), ApiError> {
            self.inner.update(conn, row)
        }
    }

    fn seed_notice(conn: &Connection) -> i64 {
        let record = InterruptionRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            area: "Zone A".to_string(),
            start_time: None,
            end_time: None,
            reason: None,
            affected_line: None,
            is_update: false,
            affected_customers: Vec::new(),
            specific_activities: Vec::new(),
            affected_areas: Vec::new(),
            notices: Vec::new(),
        };
        let (interruption_id, _) = upsert(conn, &InterruptionUpsert::new(&record)).unwrap();
        let notice = NoticeRecord {
            area: "Zone A".to_string(),
            control_no: None,
            date_issued: None,
            body: None,
            affected_customers: Vec::new(),
            specific_activities: Vec::new(),
            personnel: Vec::new(),
        };
        upsert(conn, &NoticeUpsert::new(interruption_id, &notice))
            .unwrap()
            .0
    }

    #[test]
    fn lost_insert_race_resolves_to_the_existing_row() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        let notice_id = seed_notice(&conn);

        let racing = RacingCustomer {
            inner: CustomerUpsert {
                owner: Owner::Notice(notice_id),
                name: "Juan Dela Cruz",
            },
            lookups: std::cell::Cell::new(0),
        };
        let (id, outcome) = upsert(&conn, &racing).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(customers::list(&conn, Some(notice_id), None).unwrap().len(), 1);
        assert_eq!(customers::get(&conn, id).unwrap().name, "Juan Dela Cruz");
    }

    #[test]
    fn changed_position_is_an_update() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        let notice_id = seed_notice(&conn);

        let first = PersonnelRecord {
            name: "Maria Santos".to_string(),
            position: "Area Engineer".to_string(),
        };
        let (id, outcome) = upsert(&conn, &PersonnelUpsert { notice_id, record: &first }).unwrap();
        assert_eq!(outcome, Outcome::Created);

        let (same_id, outcome) =
            upsert(&conn, &PersonnelUpsert { notice_id, record: &first }).unwrap();
        assert_eq!((same_id, outcome), (id, Outcome::Unchanged));

        let promoted = PersonnelRecord {
            name: "maria santos".to_string(),
            position: "District Manager".to_string(),
        };
        let (same_id, outcome) =
            upsert(&conn, &PersonnelUpsert { notice_id, record: &promoted }).unwrap();
        assert_eq!((same_id, outcome), (id, Outcome::Updated));
        assert_eq!(personnel::get(&conn, id).unwrap().position, "District Manager");
    }
}
