//! Storage port consumed by the HTTP handlers.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Transaction;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store closed")]
    Closed,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("{0}")]
    Injected(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => StoreError::Closed,
            sqlx::Error::PoolTimedOut => StoreError::DeadlineExceeded,
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence capability.
///
/// Implementations must be safe under concurrent `insert`/`ping`, must either
/// record a transaction or return an error, and must fail with
/// [`StoreError::Closed`] once [`Store::close`] has been called. Dropping a
/// returned future cancels the operation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, tx: Transaction) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;

    async fn close(&self);
}
