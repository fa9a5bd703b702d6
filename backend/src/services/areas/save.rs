use crate::db::areas;
use crate::error::ApiError;
use crate::services::require_text;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::area::AreaInput;

pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<AreaInput>,
) -> Result<HttpResponse, ApiError> {
    let input = payload.into_inner();
    require_text("name", &input.name)?;
    let db = state.db.clone();
    let created =
        web::block(move || db.with_connection(|conn| areas::create(conn, &input))).await??;
    Ok(HttpResponse::Created().json(created))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: web::Json<AreaInput>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let input = payload.into_inner();
    require_text("name", &input.name)?;
    let db = state.db.clone();
    let updated =
        web::block(move || db.with_connection(|conn| areas::update(conn, id, &input))).await??;
    Ok(HttpResponse::Ok().json(updated))
}
