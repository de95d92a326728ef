//! Core collector traits and types.

use std::time::Duration;

use thiserror::Error;

use super::row::Row;

/// Errors surfaced by a [`QueryExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The database rejected or failed the statement.
    #[error("query failed: {0}")]
    Failed(String),

    /// The connection is unavailable.
    #[error("connection unavailable: {0}")]
    Connection(String),

    /// Timeout elapsed before the result set arrived.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Capability to run one static query and return its rows.
///
/// Implemented by the database driver integration. Rows must preserve the
/// query's SELECT-list order.
///
/// # Error Handling Philosophy
///
/// A failing query only affects its own collector: the scrape cycle records
/// the error, keeps the collector's previously exposed values and moves on to
/// the next collector.
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `query` and return every row of its result set.
    async fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError>;
}

#[async_trait::async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<E> {
    async fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError> {
        (**self).execute(query).await
    }
}
