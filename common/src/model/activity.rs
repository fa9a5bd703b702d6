use serde::{Deserialize, Serialize};

/// Work carried out during an interruption (line maintenance, pole
/// replacement, ...), listed on a notice or directly on the interruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificActivity {
    pub id: i64,
    pub notice_id: Option<i64>,
    pub interruption_id: Option<i64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    #[serde(default)]
    pub notice_id: Option<i64>,
    #[serde(default)]
    pub interruption_id: Option<i64>,
    pub description: String,
}
