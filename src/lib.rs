pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod ports;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_MAX_BODY_BYTES};
use crate::metrics::TransactionMetrics;
use crate::ports::Store;

/// Per-request bounds applied by the transaction handler.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub store_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<&Config> for RequestLimits {
    fn from(config: &Config) -> Self {
        Self {
            store_timeout: config.store_timeout,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub metrics: Arc<dyn TransactionMetrics>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<dyn TransactionMetrics>) -> Self {
        Self {
            store,
            metrics,
            limits: RequestLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let transaction_route =
        post(handlers::create_transaction).fallback(handlers::method_not_allowed);

    Router::new()
        .route("/api/transaction/", transaction_route.clone())
        .route("/api/transaction", transaction_route)
        .route("/health", get(handlers::health))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(axum::middleware::from_fn(
            middleware::request_logger_middleware,
        ))
        .with_state(state)
}
