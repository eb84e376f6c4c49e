//! Postgres implementation of [`Store`].

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::domain::Transaction;
use crate::ports::{Store, StoreError, StoreResult};

/// Postgres-backed transaction store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date, all within `timeout`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let setup = async {
            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(timeout)
                .connect(database_url)
                .await
                .context("failed to connect to database")?;

            let store = Self::new(pool);
            if let Err(e) = store.migrate().await {
                store.pool.close().await;
                return Err(e);
            }

            Ok::<_, anyhow::Error>(store)
        };

        tokio::time::timeout(timeout, setup)
            .await
            .context("timed out connecting to database")?
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert(&self, tx: Transaction) -> StoreResult<()> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }

        sqlx::query("INSERT INTO transactions (id, amount, timestamp) VALUES ($1, $2, $3)")
            .bind(tx.id)
            .bind(tx.amount)
            .bind(tx.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }

        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
