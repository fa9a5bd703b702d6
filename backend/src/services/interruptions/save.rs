//! Creation and full replacement of interruptions.
//!
//! Both endpoints take an `InterruptionInput`. Changing the area or the date
//! through `PUT` changes the natural key; colliding with another row's key
//! is a `409`.

use crate::db::interruptions;
use crate::error::ApiError;
use crate::services::require_text;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::interruption::InterruptionInput;

pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<InterruptionInput>,
) -> Result<HttpResponse, ApiError> {
    let input = payload.into_inner();
    require_text("area", &input.area)?;
    let db = state.db.clone();
    let created =
        web::block(move || db.with_connection(|conn| interruptions::create(conn, &input)))
            .await??;
    Ok(HttpResponse::Created().json(created))
}

pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: web::Json<InterruptionInput>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let input = payload.into_inner();
    require_text("area", &input.area)?;
    let db = state.db.clone();
    let updated =
        web::block(move || db.with_connection(|conn| interruptions::update(conn, id, &input)))
            .await??;
    Ok(HttpResponse::Ok().json(updated))
}
