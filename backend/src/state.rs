//! Shared application state.
//!
//! `AppState` is built once in `main.rs` from the resolved [`AppConfig`] and
//! handed to every worker as `web::Data`. It holds no connection itself: the
//! [`Database`] handle opens a connection per operation, so cloning the state
//! into a `web::block` or `spawn_blocking` closure is cheap.

use crate::config::{AppConfig, DeletePolicy};
use crate::db::Database;
use crate::error::ApiError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage handle used by every handler and by the import reconciler.
    pub db: Database,

    /// Applied by the `DELETE` endpoints of interruptions and notices.
    pub delete_policy: DeletePolicy,

    /// Pause before an import entry is retried after a busy or locked database.
    pub retry_backoff: Duration,
}

impl AppState {
    /// Opens (and migrates) the configured database.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let db = Database::open(config.database_path()?, config.busy_timeout())?;
        Ok(Self {
            db,
            delete_policy: config.delete_policy,
            retry_backoff: config.retry_backoff(),
        })
    }
}
