use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::postgres::PgTaskRepository;
use crate::database::repository::TaskRepository;
use crate::database::sqlite::SqliteTaskRepository;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the store could not hand out a connection at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, DatabaseError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(DatabaseError::UnsupportedUrl(redact(url)))
        }
    }
}

/// Opens a pool for the configured URL and wraps it in the matching repository.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn TaskRepository>, DatabaseError> {
    let timeout = Duration::from_secs(config.connection_timeout);

    match Backend::from_url(&config.url)? {
        Backend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(timeout)
                .connect(&config.url)
                .await?;
            info!("Connected to PostgreSQL at {}", redact(&config.url));
            Ok(Arc::new(PgTaskRepository::new(pool)))
        }
        Backend::Sqlite => {
            let options = SqliteConnectOptions::from_str(&config.url)?
                .create_if_missing(true)
                .foreign_keys(true);
            // One connection: SQLite serializes writers, and an in-memory
            // database only lives as long as its connection.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(timeout)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?;
            info!("Connected to SQLite at {}", config.url);
            Ok(Arc::new(SqliteTaskRepository::new(pool)))
        }
    }
}

/// Strips credentials from a connection URL before it is logged.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
