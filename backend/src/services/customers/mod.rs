//! # Affected Customer Service Module
//!
//! Routes under `/api/customers`. Each row belongs to exactly one
//! notice or interruption (`notice_id` or `interruption_id` in the payload);
//! giving both or neither is a `400`, a missing parent is a `409`. The list
//! filters by either id.

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/customers";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(save::create))
        .route("", get().to(get::list))
        .route("/{id}", get().to(get::one))
        .route("/{id}", put().to(save::update))
        .route("/{id}", delete().to(delete::process))
}
