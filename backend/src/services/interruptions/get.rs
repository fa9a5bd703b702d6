use crate::db::interruptions;
use crate::error::ApiError;
use crate::reconcile::document::parse_date;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let db = state.db.clone();
    let interruption =
        web::block(move || db.with_connection(|conn| interruptions::get(conn, id))).await??;
    Ok(HttpResponse::Ok().json(interruption))
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let db = state.db.clone();
    let rows = web::block(move || db.with_connection(|conn| interruptions::list(conn))).await??;
    Ok(HttpResponse::Ok().json(rows))
}

/// `GET /api/interruptions/by-date/{date}`; an unparsable date is a `400`.
pub async fn by_date(
    state: web::Data<AppState>,
    date: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let date = parse_date(&date).map_err(ApiError::Validation)?;
    let db = state.db.clone();
    let rows =
        web::block(move || db.with_connection(|conn| interruptions::list_by_date(conn, date)))
            .await??;
    Ok(HttpResponse::Ok().json(rows))
}

/// `GET /api/interruptions/by-area/{area}`, matched on the normalized area.
pub async fn by_area(
    state: web::Data<AppState>,
    area: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area = area.into_inner();
    let db = state.db.clone();
    let rows =
        web::block(move || db.with_connection(|conn| interruptions::list_by_area(conn, &area)))
            .await??;
    Ok(HttpResponse::Ok().json(rows))
}
