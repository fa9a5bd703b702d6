//! `GET /api/full-data`: the whole database as one nested document, in the
//! shape `POST /api/import` accepts.

use crate::error::ApiError;
use crate::reconcile::export::export_document;
use crate::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};

const API_PATH: &str = "/api/full-data";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let db = state.db.clone();
    let document = web::block(move || db.with_connection(|conn| export_document(conn))).await??;
    Ok(HttpResponse::Ok().json(document))
}
