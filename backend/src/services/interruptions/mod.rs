//! # Interruption Service Module
//!
//! Routes for the top-level entity, mounted under `/api/interruptions`.
//!
//! ## Sub-modules:
//! - `get`: single lookups and the listings (all, by date, by area).
//! - `save`: creation and full replacement.
//! - `delete`: removal, honouring the configured delete policy.

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

/// The base path for all interruption endpoints.
const API_PATH: &str = "/api/interruptions";

/// Configures and returns the Actix `Scope` for interruption routes.
///
/// # Registered Routes:
///
/// *   **`POST /`**: creates an interruption from an `InterruptionInput`; `201 Created`.
/// *   **`GET /`**: every interruption, ordered by date.
/// *   **`GET /by-date/{date}`**: interruptions on one `YYYY-MM-DD` date.
/// *   **`GET /by-area/{area}`**: interruptions whose normalized area matches.
/// *   **`GET /{id}`**, **`PUT /{id}`**, **`DELETE /{id}`**: the usual single-row operations.
///     A delete of an interruption that still has notices answers `409` under the
///     `reject` policy and removes the whole subtree under `cascade`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(save::create))
        .route("", get().to(get::list))
        .route("/by-date/{date}", get().to(get::by_date))
        .route("/by-area/{area}", get().to(get::by_area))
        .route("/{id}", get().to(get::one))
        .route("/{id}", put().to(save::update))
        .route("/{id}", delete().to(delete::process))
}
