#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use transaction_store::adapters::MemoryStore;
use transaction_store::metrics::{NoopMetrics, PrometheusMetrics};
use transaction_store::{create_app, AppState};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub metrics: Arc<PrometheusMetrics>,
}

/// Router backed by a fresh `MemoryStore` and a private Prometheus registry.
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(PrometheusMetrics::new().unwrap());
    let router = create_app(AppState::new(store.clone(), metrics.clone()));
    TestApp {
        router,
        store,
        metrics,
    }
}

/// Router with metrics emission suppressed.
pub fn quiet_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let router = create_app(AppState::new(store.clone(), Arc::new(NoopMetrics)));
    (router, store)
}

pub fn payload(id: &str, amount: &str, timestamp: DateTime<Utc>) -> Value {
    json!({
        "transactionId": id,
        "amount": amount,
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(router: &Router, body: &Value) -> Response<Body> {
    send(
        router,
        Method::POST,
        "/api/transaction/",
        Body::from(body.to_string()),
    )
    .await
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
