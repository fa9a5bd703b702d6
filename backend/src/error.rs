//! Error taxonomy shared by the storage layer, the import reconciler and the
//! HTTP handlers.
//!
//! Every `rusqlite::Error` is classified here, once: busy/locked databases
//! become [`ApiError::TransientStorage`], constraint failures become
//! [`ApiError::Conflict`], everything else stays a plain storage error.

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::import::FailureKind;
use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input: missing or blank field, unparsable date, wrong JSON type.
    #[error("validation error: {0}")]
    Validation(String),

    /// A storage constraint rejected the write (unique key, foreign key, trigger).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Delete of a parent row that still has children, under the `reject` policy.
    #[error("{entity} {id} has dependents")]
    HasDependents { entity: &'static str, id: i64 },

    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// Busy or locked database; the operation may succeed if retried.
    #[error("transient storage error: {0}")]
    TransientStorage(String),

    #[error("storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] BlockingError),

    #[error("import task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                ApiError::TransientStorage(err.to_string())
            }
            Some(ErrorCode::ConstraintViolation) => ApiError::Conflict(constraint_message(&err)),
            _ => ApiError::Storage(err),
        }
    }
}

fn constraint_message(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
        other => other.to_string(),
    }
}

/// True when `err` is a UNIQUE (or primary key) violation, i.e. another
/// writer already holds the natural key being inserted.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

impl ApiError {
    /// Machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::Json(_) => "validation",
            ApiError::Conflict(_) | ApiError::HasDependents { .. } => "conflict",
            ApiError::NotFound { .. } => "not_found",
            ApiError::TransientStorage(_) => "transient_storage",
            ApiError::Storage(_)
            | ApiError::Config(_)
            | ApiError::Io(_)
            | ApiError::Blocking(_)
            | ApiError::Join(_) => "storage",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::TransientStorage(_))
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self.kind() {
            "validation" => FailureKind::Validation,
            "conflict" => FailureKind::Conflict,
            "transient_storage" => FailureKind::TransientStorage,
            _ => FailureKind::Storage,
        }
    }

    fn subject(&self) -> (Option<&'static str>, Option<i64>) {
        match self {
            ApiError::NotFound { entity, id } | ApiError::HasDependents { entity, id } => {
                (Some(entity), Some(*id))
            }
            _ => (None, None),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Json(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::HasDependents { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::TransientStorage(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_)
            | ApiError::Config(_)
            | ApiError::Io(_)
            | ApiError::Blocking(_)
            | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (entity, id) = self.subject();
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "entity": entity,
            "id": id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32, message: Option<&str>) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), message.map(str::to_string))
    }

    #[test]
    fn busy_and_locked_are_transient() {
        assert!(ApiError::from(sqlite_failure(ffi::SQLITE_BUSY, None)).is_transient());
        assert!(ApiError::from(sqlite_failure(ffi::SQLITE_LOCKED, None)).is_transient());
    }

    #[test]
    fn constraint_failures_become_conflicts() {
        let err = ApiError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            Some("FOREIGN KEY constraint failed"),
        ));
        assert_eq!(err.kind(), "conflict");
        assert_eq!(
            err.to_string(),
            "constraint violation: FOREIGN KEY constraint failed"
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unique_violation_is_detected_from_extended_code() {
        assert!(is_unique_violation(&sqlite_failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            None
        )));
        assert!(!is_unique_violation(&sqlite_failure(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            None
        )));
        assert!(!is_unique_violation(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn has_dependents_reads_as_a_conflict() {
        let err = ApiError::HasDependents {
            entity: "interruption",
            id: 7,
        };
        assert_eq!(err.to_string(), "interruption 7 has dependents");
        assert_eq!(err.failure_kind(), FailureKind::Conflict);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_sqlite_errors_stay_storage_errors() {
        let err = ApiError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), "storage");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
