use serde::{Deserialize, Serialize};

/// A customer named as affected. Listed either on a notice or directly on
/// the interruption; exactly one of `notice_id` / `interruption_id` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedCustomer {
    pub id: i64,
    pub notice_id: Option<i64>,
    pub interruption_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub notice_id: Option<i64>,
    #[serde(default)]
    pub interruption_id: Option<i64>,
    pub name: String,
}
