use serde::{Deserialize, Serialize};

/// A staff member named on a notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: i64,
    pub notice_id: i64,
    pub name: String,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelInput {
    pub notice_id: i64,
    pub name: String,
    pub position: String,
}
