//! # Document Import
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the document as loose JSON, so a
//!     malformed entry is reported per entry instead of rejecting the body.
//!
//! 2.  **Splitting**: `document_entries` accepts the three document shapes. A
//!     body that is neither an array nor an object is a `400`.
//!
//! 3.  **Reconciliation**: the entries are handed to `reconcile::reconcile` on
//!     the blocking pool via `tokio::task::spawn_blocking`; each entry commits
//!     or rolls back on its own.
//!
//! 4.  **HTTP Response**: `200 OK` with the `ImportReport`, also when some
//!     entries failed. Only a storage failure before the first entry (the
//!     database cannot be opened) turns into an error status.

use crate::error::ApiError;
use crate::reconcile::{self, document::document_entries};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::Value;

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let entries = document_entries(payload.into_inner())?;
    let db = state.db.clone();
    let backoff = state.retry_backoff;

    let report =
        tokio::task::spawn_blocking(move || reconcile::reconcile(&db, &entries, backoff))
            .await??;
    Ok(HttpResponse::Ok().json(report))
}
