use serde::{Deserialize, Serialize};

/// A named area affected by an interruption (a town or district).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedArea {
    pub id: i64,
    pub interruption_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInput {
    pub interruption_id: i64,
    pub name: String,
}

/// A barangay inside an affected area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barangay {
    pub id: i64,
    pub area_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarangayInput {
    pub area_id: i64,
    pub name: String,
}
