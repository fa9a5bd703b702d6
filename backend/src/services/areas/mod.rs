//! # Affected Area Service Module
//!
//! Routes under `/api/areas`. An area belongs to one interruption and groups
//! barangays; `DELETE` follows the configured delete policy for them.

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/areas";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(save::create))
        .route("", get().to(get::list))
        .route("/{id}", get().to(get::one))
        .route("/{id}", put().to(save::update))
        .route("/{id}", delete().to(delete::process))
}
