//! # Notice Service Module
//!
//! Routes under `/api/notices`. A notice always belongs to one interruption;
//! creating or moving it under a missing interruption is a `409`, not a `404`.

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/notices";

/// # Registered Routes:
///
/// *   **`POST /`**: creates a notice from a `NoticeInput`.
/// *   **`GET /?interruption_id=`**: all notices, optionally of one interruption.
/// *   **`GET /{id}`**, **`PUT /{id}`**, **`DELETE /{id}`**. Delete honours the
///     configured policy when customers, activities or personnel remain.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(save::create))
        .route("", get().to(get::list))
        .route("/{id}", get().to(get::one))
        .route("/{id}", put().to(save::update))
        .route("/{id}", delete().to(delete::process))
}
