use axum::{
    body::Body,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics::{RequestOutcome, RequestTimer};
use crate::ports::StoreError;
use crate::validation::TransactionRequest;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub status: String,
    pub id: Uuid,
}

/// Method fallback for the transaction route. Runs before any body read and
/// touches no metrics.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    tracing::warn!(method = %method, path = %uri.path(), "invalid method");
    AppError::MethodNotAllowed
}

/// `POST /api/transaction/`
///
/// Stages run in a fixed order and the first failure short-circuits:
/// body decode, identifier, amount, store insert. Every outcome bumps exactly
/// one of the success/error counters and the duration histogram once, also
/// when the client goes away and the future is dropped mid-insert.
pub async fn create_transaction(State(state): State<AppState>, body: Body) -> Response {
    let _timer = RequestTimer::start(state.metrics.as_ref());
    let outcome = RequestOutcome::start(state.metrics.as_ref());

    match process(&state, body).await {
        Ok(id) => {
            outcome.success();
            let body = CreatedResponse {
                status: "success".to_string(),
                id,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(err) => {
            outcome.error();
            err.into_response()
        }
    }
}

async fn process(state: &AppState, body: Body) -> Result<Uuid, AppError> {
    let bytes = axum::body::to_bytes(body, state.limits.max_body_bytes)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "failed to read request body");
            AppError::InvalidBody(e.to_string())
        })?;

    let req: TransactionRequest = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(error = %e, "failed to decode request");
        AppError::InvalidBody(e.to_string())
    })?;

    tracing::debug!(
        transaction_id = %req.transaction_id,
        amount = %req.amount,
        timestamp = %req.timestamp,
        "successfully decoded request"
    );

    let tx = req.validate().map_err(|e| {
        tracing::warn!(field = e.field, value = %e.value, error = %e.message, "invalid {}", e.field);
        AppError::from(e)
    })?;

    let id = tx.id;
    let insert = state.store.insert(tx);
    let result = match tokio::time::timeout(state.limits.store_timeout, insert).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::DeadlineExceeded),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, tx_id = %id, "failed to insert transaction");
        return Err(AppError::StorageFailure(e));
    }

    tracing::info!(tx_id = %id, "transaction stored");
    Ok(id)
}
