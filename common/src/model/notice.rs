use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A published notice. Always owned by one interruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: i64,
    pub interruption_id: i64,
    pub area: String,
    pub control_no: Option<String>,
    pub date_issued: Option<NaiveDate>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeInput {
    pub interruption_id: i64,
    pub area: String,
    #[serde(default)]
    pub control_no: Option<String>,
    #[serde(default)]
    pub date_issued: Option<NaiveDate>,
    #[serde(default)]
    pub body: Option<String>,
}
