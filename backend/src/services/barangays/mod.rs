//! # Barangay Service Module
//!
//! Routes under `/api/barangays`, filtered by `?area_id=`.

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/barangays";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(save::create))
        .route("", get().to(get::list))
        .route("/{id}", get().to(get::one))
        .route("/{id}", put().to(save::update))
        .route("/{id}", delete().to(delete::process))
}
