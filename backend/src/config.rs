use crate::error::ApiError;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// What `DELETE` does with a parent row that still has children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeletePolicy {
    /// Refuse with a "has dependents" conflict and leave the row in place.
    Reject,
    /// Delete the whole subtree in one transaction.
    Cascade,
}

/// Runtime settings. Every flag can also be given through the environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Storage connection string: `sqlite://path/to/file.sqlite` or a bare path
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://outages.sqlite")]
    pub database_url: String,

    /// Address the HTTP server binds to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Delete behaviour for rows that still have children
    #[arg(long, env = "DELETE_POLICY", value_enum, default_value = "reject")]
    pub delete_policy: DeletePolicy,

    /// How long a statement waits on a locked database before failing
    #[arg(long, env = "BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Pause before an import entry is retried after a transient failure
    #[arg(long, env = "IMPORT_RETRY_BACKOFF_MS", default_value_t = 250)]
    pub import_retry_backoff_ms: u64,
}

impl AppConfig {
    pub fn database_path(&self) -> Result<PathBuf, ApiError> {
        parse_database_url(&self.database_url)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.import_retry_backoff_ms)
    }
}

/// Resolves the SQLite file behind a connection string.
///
/// In-memory databases are refused: every operation opens its own
/// connection, so each one would see an empty schema.
pub fn parse_database_url(url: &str) -> Result<PathBuf, ApiError> {
    let url = url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    // `sqlite://file.db?mode=rwc` style options are not used here
    let path = path.split('?').next().unwrap_or_default();

    if path.contains("://") {
        return Err(ApiError::Config(format!(
            "unsupported database URL '{}': only sqlite is available",
            url
        )));
    }
    if path.is_empty() || path == ":memory:" {
        return Err(ApiError::Config(format!(
            "database URL '{}' does not name a file",
            url
        )));
    }
    Ok(PathBuf::from(path))
}
