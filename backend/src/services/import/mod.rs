//! # Import Service Module
//!
//! `POST /api/import` accepts a nested interruption document (a bare array,
//! `{"interruptions": [...]}`, or a single entry) and answers with the
//! `ImportReport` of the reconciliation.

mod upload;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/import";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(upload::process))
}
