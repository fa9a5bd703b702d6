//! The nested interruption document.
//!
//! This is the shape accepted by `POST /api/import` and produced by
//! `GET /api/full-data`: a JSON array of interruptions, each carrying its
//! notices, and each notice carrying its customers, activities and personnel.
//! An interruption may also list customers and activities directly, and the
//! areas (with their barangays) it affects.
//! Exporting and re-importing a document leaves the database unchanged.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionRecord {
    pub date: NaiveDate,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_line: Option<String>,
    #[serde(default)]
    pub is_update: bool,
    /// Customers listed on the interruption itself rather than on a notice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_customers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_areas: Vec<AffectedAreaRecord>,
    #[serde(default)]
    pub notices: Vec<NoticeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedAreaRecord {
    pub name: String,
    #[serde(default)]
    pub barangays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeRecord {
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub affected_customers: Vec<String>,
    #[serde(default)]
    pub specific_activities: Vec<String>,
    #[serde(default)]
    pub personnel: Vec<PersonnelRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    pub name: String,
    pub position: String,
}
