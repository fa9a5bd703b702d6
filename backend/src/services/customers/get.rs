use crate::db::customers;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::OwnerListQuery;

pub async fn one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let db = state.db.clone();
    let row = web::block(move || db.with_connection(|conn| customers::get(conn, id))).await??;
    Ok(HttpResponse::Ok().json(row))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<OwnerListQuery>,
) -> Result<HttpResponse, ApiError> {
    let OwnerListQuery {
        notice_id,
        interruption_id,
    } = query.into_inner();
    let db = state.db.clone();
    let rows = web::block(move || {
        db.with_connection(|conn| customers::list(conn, notice_id, interruption_id))
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}
