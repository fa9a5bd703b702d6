//! # Import Reconciler
//!
//! Maps a nested interruption document onto the relational tables without
//! creating duplicates, so that importing the same document again changes
//! nothing.
//!
//! ## Workflow
//!
//! 1.  **Validation**: each top-level entry is validated on its own
//!     (`document::validate_entry`). A malformed entry is recorded as a
//!     failure and skipped; its siblings carry on.
//!
//! 2.  **Per-entry transaction**: a valid entry is written inside one
//!     `BEGIN IMMEDIATE` transaction covering the interruption, the
//!     customers, activities and areas (with barangays) listed on it, its
//!     notices, and their customers, activities and personnel. Any error drops the
//!     transaction, rolling back that entry only; entries committed earlier
//!     stay.
//!
//! 3.  **Identity resolution**: every row is matched by natural key
//!     (`upsert::upsert`): (date, area) for interruptions, (parent id, text)
//!     below. Rows are inserted when absent, updated only when an attribute
//!     changed, and otherwise left alone.
//!
//! 4.  **Retry**: a busy or locked database is retried once per entry after
//!     a backoff before the entry is recorded as failed.
//!
//! 5.  **Report**: the resulting [`ImportReport`] carries per-kind counts and
//!     one failure record per rejected entry.

pub mod document;
pub mod export;
mod upsert;

use crate::db::{Database, Owner};
use crate::error::ApiError;
use common::model::document::InterruptionRecord;
use common::model::import::{EntityKind, EntryFailure, ImportReport, KindCounts};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use upsert::{
    upsert, ActivityUpsert, AreaUpsert, BarangayUpsert, CustomerUpsert, InterruptionUpsert,
    NoticeUpsert, PersonnelUpsert,
};
use uuid::Uuid;

/// Transient failures are retried this many times per entry.
const TRANSIENT_RETRIES: u32 = 1;

/// An error raised while writing an entry, tagged with the entity kind that
/// was being written.
#[derive(Debug)]
struct EntryError {
    entity: EntityKind,
    error: ApiError,
}

fn at<E: Into<ApiError>>(entity: EntityKind) -> impl Fn(E) -> EntryError {
    move |error| EntryError {
        entity,
        error: error.into(),
    }
}

/// Reconciles every entry of `entries` into `db`.
///
/// Only a failure to open the database at all is returned as `Err`; every
/// entry-level problem ends up in the report.
pub fn reconcile(
    db: &Database,
    entries: &[Value],
    retry_backoff: Duration,
) -> Result<ImportReport, ApiError> {
    let mut report = ImportReport::new(Uuid::new_v4().to_string());
    report.entries = entries.len();
    let mut conn = db.connect()?;
    info!(
        "Import {} started with {} entries",
        report.import_id,
        entries.len()
    );

    for (index, entry) in entries.iter().enumerate() {
        let record = match document::validate_entry(entry) {
            Ok(record) => record,
            Err(invalid) => {
                let (date, area) = document::raw_key(entry);
                let entity = invalid.entity;
                record_failure(&mut report, index, date, area, entity, invalid.into());
                continue;
            }
        };

        match reconcile_with_retry(&mut conn, &record, retry_backoff) {
            Ok(counts) => report.counts.absorb(&counts),
            Err(EntryError { entity, error }) => record_failure(
                &mut report,
                index,
                Some(record.date.to_string()),
                Some(record.area.clone()),
                entity,
                error,
            ),
        }
    }

    let interruptions = &report.counts.interruptions;
    info!(
        "Import {} finished: {} of {} entries committed \
         (interruptions created={} updated={} unchanged={}), {} failed",
        report.import_id,
        report.committed(),
        report.entries,
        interruptions.created,
        interruptions.updated,
        interruptions.unchanged,
        report.failures.len()
    );
    Ok(report)
}

fn record_failure(
    report: &mut ImportReport,
    index: usize,
    date: Option<String>,
    area: Option<String>,
    entity: EntityKind,
    error: ApiError,
) {
    warn!(
        "Import {} entry {} ({} / {}) failed at {}: {}",
        report.import_id,
        index,
        date.as_deref().unwrap_or("?"),
        area.as_deref().unwrap_or("?"),
        entity.as_str(),
        error
    );
    report.counts.get_mut(entity).failed += 1;
    report.failures.push(EntryFailure {
        index,
        date,
        area,
        entity,
        kind: error.failure_kind(),
        reason: error.to_string(),
    });
}

fn reconcile_with_retry(
    conn: &mut Connection,
    record: &InterruptionRecord,
    backoff: Duration,
) -> Result<KindCounts, EntryError> {
    let mut attempt = 0;
    loop {
        match reconcile_entry(conn, record) {
            Err(e) if e.error.is_transient() && attempt < TRANSIENT_RETRIES => {
                attempt += 1;
                warn!(
                    "Retrying interruption ({}, {}) after transient error: {}",
                    record.date, record.area, e.error
                );
                thread::sleep(backoff * attempt);
            }
            result => return result,
        }
    }
}

/// Writes one interruption and everything below it in a single transaction.
///
/// Returning early drops the transaction, which rolls it back.
fn reconcile_entry(
    conn: &mut Connection,
    record: &InterruptionRecord,
) -> Result<KindCounts, EntryError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(at(EntityKind::Interruption))?;
    let mut counts = KindCounts::default();

    let (interruption_id, outcome) =
        upsert(&tx, &InterruptionUpsert::new(record)).map_err(at(EntityKind::Interruption))?;
    counts.interruptions.record(outcome);

    let owner = Owner::Interruption(interruption_id);
    upsert_named_lists(
        &tx,
        owner,
        &record.affected_customers,
        &record.specific_activities,
        &mut counts,
    )?;
    for area in &record.affected_areas {
        let (area_id, outcome) = upsert(
            &tx,
            &AreaUpsert {
                interruption_id,
                name: &area.name,
            },
        )
        .map_err(at(EntityKind::Area))?;
        counts.areas.record(outcome);

        for name in &area.barangays {
            let (_, outcome) =
                upsert(&tx, &BarangayUpsert { area_id, name }).map_err(at(EntityKind::Barangay))?;
            counts.barangays.record(outcome);
        }
    }

    for notice in &record.notices {
        let (notice_id, outcome) = upsert(&tx, &NoticeUpsert::new(interruption_id, notice))
            .map_err(at(EntityKind::Notice))?;
        counts.notices.record(outcome);

        upsert_named_lists(
            &tx,
            Owner::Notice(notice_id),
            &notice.affected_customers,
            &notice.specific_activities,
            &mut counts,
        )?;
        for person in &notice.personnel {
            let (_, outcome) = upsert(
                &tx,
                &PersonnelUpsert {
                    notice_id,
                    record: person,
                },
            )
            .map_err(at(EntityKind::Personnel))?;
            counts.personnel.record(outcome);
        }
    }

    tx.commit().map_err(at(EntityKind::Interruption))?;
    Ok(counts)
}

fn upsert_named_lists(
    conn: &Connection,
    owner: Owner,
    customers: &[String],
    activities: &[String],
    counts: &mut KindCounts,
) -> Result<(), EntryError> {
    for name in customers {
        let (_, outcome) =
            upsert(conn, &CustomerUpsert { owner, name }).map_err(at(EntityKind::Customer))?;
        counts.customers.record(outcome);
    }
    for description in activities {
        let (_, outcome) = upsert(conn, &ActivityUpsert { owner, description })
            .map_err(at(EntityKind::Activity))?;
        counts.activities.record(outcome);
    }
    Ok(())
}
