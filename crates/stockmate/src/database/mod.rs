//! Inventory database access
//!
//! A [`QueryRunner`] opens one connection per call, runs the statement and
//! closes the connection on every exit path.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::error::Result;
use crate::types::QueryTable;

#[cfg(feature = "mssql")]
pub mod mssql;
pub mod sqlite;

pub use sqlite::SqliteRunner;

/// Why a statement produced no table
///
/// The display text is what users see in the reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The database could not be reached; the statement was not sent
    #[error("❌ Could not establish connection to the database.")]
    Connection,

    /// The database rejected the statement
    #[error("❌ SQL Error: {0}")]
    Query(String),
}

/// Executes SQL against the inventory database
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Run one statement and collect every row
    async fn run(&self, sql: &str) -> std::result::Result<QueryTable, QueryError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Build the runner selected in the configuration
pub fn runner_from_config(config: &DatabaseConfig) -> Result<Arc<dyn QueryRunner>> {
    match config.backend {
        DatabaseBackend::Sqlite => {
            tracing::warn!(
                "Using the SQLite backend; generated T-SQL (TOP, GETDATE) will be rejected"
            );
            Ok(Arc::new(SqliteRunner::new(&config.sqlite_path)))
        }
        #[cfg(feature = "mssql")]
        DatabaseBackend::Mssql => Ok(Arc::new(mssql::MssqlRunner::new(
            &config.connection_string,
        )?)),
        #[cfg(not(feature = "mssql"))]
        DatabaseBackend::Mssql => Err(crate::error::Error::Config(
            "The mssql backend requires building with the `mssql` feature".to_string(),
        )),
    }
}
