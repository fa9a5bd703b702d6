use crate::db::notices;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::InterruptionChildListQuery;

pub async fn one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let db = state.db.clone();
    let notice = web::block(move || db.with_connection(|conn| notices::get(conn, id))).await??;
    Ok(HttpResponse::Ok().json(notice))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<InterruptionChildListQuery>,
) -> Result<HttpResponse, ApiError> {
    let interruption_id = query.interruption_id;
    let db = state.db.clone();
    let rows =
        web::block(move || db.with_connection(|conn| notices::list(conn, interruption_id)))
            .await??;
    Ok(HttpResponse::Ok().json(rows))
}
