use crate::db::personnel;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::NoticeChildListQuery;

pub async fn one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let db = state.db.clone();
    let row = web::block(move || db.with_connection(|conn| personnel::get(conn, id))).await??;
    Ok(HttpResponse::Ok().json(row))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<NoticeChildListQuery>,
) -> Result<HttpResponse, ApiError> {
    let notice_id = query.notice_id;
    let db = state.db.clone();
    let rows =
        web::block(move || db.with_connection(|conn| personnel::list(conn, notice_id))).await??;
    Ok(HttpResponse::Ok().json(rows))
}
