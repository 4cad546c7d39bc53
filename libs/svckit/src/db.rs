//! Database handle shared by the service modules.
//!
//! The server opens one handle per enabled module at startup, hands it to the
//! module and closes it after the HTTP server has drained.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool settings for one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_conns: Option<u32>,
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub acquire_timeout: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://postboard.db?mode=rwc".to_owned(),
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(5)),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unknown database scheme in DSN '{0}'")]
    UnknownDsn(String),

    #[error(transparent)]
    Sea(#[from] DbErr),
}

/// Supported engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Open connection pool plus what it was opened with.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    conn: DatabaseConnection,
    redacted_dsn: String,
}

impl DbHandle {
    /// Infer the engine from the DSN scheme.
    ///
    /// # Errors
    /// Returns [`DbError::UnknownDsn`] for any scheme other than postgres or sqlite.
    pub fn detect(dsn: &str) -> Result<DbEngine, DbError> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_dsn(dsn)))
        }
    }

    /// Connect a pool according to `cfg`.
    ///
    /// In-memory `SQLite` is pinned to a single connection, since every
    /// connection would otherwise see its own empty database.
    ///
    /// # Errors
    /// Returns an error if the DSN is unsupported or the connection fails.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, DbError> {
        let engine = Self::detect(&cfg.dsn)?;
        let redacted_dsn = redact_dsn(&cfg.dsn);

        let mut opts = ConnectOptions::new(cfg.dsn.clone());
        opts.sqlx_logging(false);
        if is_in_memory_sqlite(&cfg.dsn) {
            opts.max_connections(1).min_connections(1);
        } else if let Some(max) = cfg.max_conns {
            opts.max_connections(max);
        }
        if let Some(timeout) = cfg.acquire_timeout {
            opts.acquire_timeout(timeout);
        }

        let conn = Database::connect(opts).await?;
        tracing::info!(dsn = %redacted_dsn, ?engine, "database connected");

        Ok(Self {
            engine,
            conn,
            redacted_dsn,
        })
    }

    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// DSN with any password masked, safe for logs.
    #[must_use]
    pub fn dsn(&self) -> &str {
        &self.redacted_dsn
    }

    /// Close the pool. Clones of the connection held elsewhere stop working.
    ///
    /// # Errors
    /// Returns an error if the driver fails to shut the pool down.
    pub async fn close(self) -> Result<(), DbError> {
        tracing::info!(dsn = %self.redacted_dsn, "closing database");
        self.conn.close().await?;
        Ok(())
    }
}

fn is_in_memory_sqlite(dsn: &str) -> bool {
    dsn.starts_with("sqlite:") && dsn.contains(":memory:")
}

/// Mask the password of a DSN for logging.
#[must_use]
pub fn redact_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_owned();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => match parsed.password() {
            Some(_) => match parsed.set_password(Some("***")) {
                Ok(()) => parsed.to_string(),
                Err(()) => "***".to_owned(),
            },
            // opaque `scheme:user:pass@...` forms keep credentials in the path
            None if parsed.cannot_be_a_base() => "***".to_owned(),
            None => parsed.to_string(),
        },
        Err(_) => "***".to_owned(),
    }
}
