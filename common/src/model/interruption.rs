use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A power interruption as stored, identified by `id` and by the natural
/// key (`date`, `area`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interruption {
    pub id: i64,
    pub date: NaiveDate,
    /// Display spelling of the area, as first recorded.
    pub area: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub affected_line: Option<String>,
    /// Whether the source bulletin announced this as an update to an earlier one.
    pub is_update: bool,
}

/// Payload of `POST /api/interruptions` and `PUT /api/interruptions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionInput {
    pub date: NaiveDate,
    pub area: String,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub affected_line: Option<String>,
    #[serde(default)]
    pub is_update: bool,
}
