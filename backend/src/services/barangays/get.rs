use crate::db::barangays;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::BarangayListQuery;

pub async fn one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let db = state.db.clone();
    let barangay =
        web::block(move || db.with_connection(|conn| barangays::get(conn, id))).await??;
    Ok(HttpResponse::Ok().json(barangay))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<BarangayListQuery>,
) -> Result<HttpResponse, ApiError> {
    let area_id = query.area_id;
    let db = state.db.clone();
    let rows =
        web::block(move || db.with_connection(|conn| barangays::list(conn, area_id))).await??;
    Ok(HttpResponse::Ok().json(rows))
}
