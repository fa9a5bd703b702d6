use serde::Deserialize;

/// Query string of the interruption-child listings (`/api/notices`, `/api/areas`).
#[derive(Debug, Default, Deserialize)]
pub struct InterruptionChildListQuery {
    pub interruption_id: Option<i64>,
}

/// Query string of `GET /api/personnel`.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeChildListQuery {
    pub notice_id: Option<i64>,
}

/// Query string of the customer and activity listings. Both filters may be
/// combined; `interruption_id` matches rows listed directly on the interruption.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerListQuery {
    pub notice_id: Option<i64>,
    pub interruption_id: Option<i64>,
}

/// Query string of `GET /api/barangays`.
#[derive(Debug, Default, Deserialize)]
pub struct BarangayListQuery {
    pub area_id: Option<i64>,
}
