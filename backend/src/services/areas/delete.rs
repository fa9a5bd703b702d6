use crate::db::areas;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let policy = state.delete_policy;
    let db = state.db.clone();
    web::block(move || db.with_connection(|conn| areas::delete(conn, id, policy))).await??;
    Ok(HttpResponse::NoContent().finish())
}
