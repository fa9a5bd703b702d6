use crate::db::notices;
use crate::error::ApiError;
use crate::services::require_text;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::notice::NoticeInput;

pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NoticeInput>,
) -> Result<HttpResponse, ApiError> {
    let input = payload.into_inner();
    require_text("area", &input.area)?;
    let db = state.db.clone();
    let created =
        web::block(move || db.with_connection(|conn| notices::create(conn, &input))).await??;
    Ok(HttpResponse::Created().json(created))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: web::Json<NoticeInput>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let input = payload.into_inner();
    require_text("area", &input.area)?;
    let db = state.db.clone();
    let updated =
        web::block(move || db.with_connection(|conn| notices::update(conn, id, &input)))
            .await??;
    Ok(HttpResponse::Ok().json(updated))
}
