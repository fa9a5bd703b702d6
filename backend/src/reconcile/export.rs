//! Rebuilds the nested document from the relational tables.
//!
//! The output has the same shape [`super::reconcile`] accepts, so an exported
//! document imports back as all-unchanged.

use crate::db::{activities, areas, barangays, customers, interruptions, notices, personnel, Owner};
use crate::error::ApiError;
use common::model::document::{
    AffectedAreaRecord, InterruptionRecord, NoticeRecord, PersonnelRecord,
};
use rusqlite::Connection;
use std::collections::HashMap;

/// Every interruption ordered by date, with its full subtree.
pub fn export_document(conn: &Connection) -> Result<Vec<InterruptionRecord>, ApiError> {
    let mut customers_by_owner: HashMap<Owner, Vec<String>> = HashMap::new();
    for customer in customers::list(conn, None, None)? {
        let owner = Owner::from_ids(customer.notice_id, customer.interruption_id)?;
        customers_by_owner.entry(owner).or_default().push(customer.name);
    }

    let mut activities_by_owner: HashMap<Owner, Vec<String>> = HashMap::new();
    for activity in activities::list(conn, None, None)? {
        let owner = Owner::from_ids(activity.notice_id, activity.interruption_id)?;
        activities_by_owner
            .entry(owner)
            .or_default()
            .push(activity.description);
    }

    let mut barangays_by_area: HashMap<i64, Vec<String>> = HashMap::new();
    for barangay in barangays::list(conn, None)? {
        barangays_by_area
            .entry(barangay.area_id)
            .or_default()
            .push(barangay.name);
    }

    let mut areas_by_interruption: HashMap<i64, Vec<AffectedAreaRecord>> = HashMap::new();
    for area in areas::list(conn, None)? {
        areas_by_interruption
            .entry(area.interruption_id)
            .or_default()
            .push(AffectedAreaRecord {
                barangays: barangays_by_area.remove(&area.id).unwrap_or_default(),
                name: area.name,
            });
    }

    let mut personnel_by_notice: HashMap<i64, Vec<PersonnelRecord>> = HashMap::new();
    for person in personnel::list(conn, None)? {
        personnel_by_notice
            .entry(person.notice_id)
            .or_default()
            .push(PersonnelRecord {
                name: person.name,
                position: person.position,
            });
    }

    let mut notices_by_interruption: HashMap<i64, Vec<NoticeRecord>> = HashMap::new();
    for notice in notices::list(conn, None)? {
        let owner = Owner::Notice(notice.id);
        notices_by_interruption
            .entry(notice.interruption_id)
            .or_default()
            .push(NoticeRecord {
                area: notice.area,
                control_no: notice.control_no,
                date_issued: notice.date_issued,
                body: notice.body,
                affected_customers: customers_by_owner.remove(&owner).unwrap_or_default(),
                specific_activities: activities_by_owner.remove(&owner).unwrap_or_default(),
                personnel: personnel_by_notice.remove(&notice.id).unwrap_or_default(),
            });
    }

    Ok(interruptions::list(conn)?
        .into_iter()
        .map(|interruption| {
            let owner = Owner::Interruption(interruption.id);
            InterruptionRecord {
                affected_customers: customers_by_owner.remove(&owner).unwrap_or_default(),
                specific_activities: activities_by_owner.remove(&owner).unwrap_or_default(),
                affected_areas: areas_by_interruption
                    .remove(&interruption.id)
                    .unwrap_or_default(),
                notices: notices_by_interruption
                    .remove(&interruption.id)
                    .unwrap_or_default(),
                date: interruption.date,
                area: interruption.area,
                start_time: interruption.start_time,
                end_time: interruption.end_time,
                reason: interruption.reason,
                affected_line: interruption.affected_line,
                is_update: interruption.is_update,
            }
        })
        .collect())
}
