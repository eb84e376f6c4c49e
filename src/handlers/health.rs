use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AppError;
use crate::AppState;

/// Upper bound on a liveness probe, independent of the caller's own deadline.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// `GET /health`. Pings the store; never touches transaction metrics.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let outcome = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, state.store.ping()).await;

    let cause = match outcome {
        Ok(Ok(())) => {
            let body = HealthStatus {
                status: "healthy".to_string(),
            };
            return Ok((StatusCode::OK, Json(body)));
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("ping timed out after {:?}", HEALTH_CHECK_TIMEOUT),
    };

    tracing::error!(error = %cause, "health check failed");
    Err(AppError::Unhealthy(cause))
}
