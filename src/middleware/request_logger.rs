use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags every request with an id, runs the rest of the stack inside a span
/// carrying it, and logs the request and response lines.
pub async fn request_logger_middleware(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    // Uuid text is always a valid header value.
    let header_value = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = header_value.clone() {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let span = tracing::info_span!("request", request_id = %request_id);

    let mut response = async {
        tracing::info!(method = %method, uri = %uri, "Incoming request");

        let response = next.run(req).await;

        tracing::info!(
            method = %method,
            uri = %uri,
            status = %response.status().as_u16(),
            latency_ms = start.elapsed().as_millis(),
            "Outgoing response"
        );

        response
    }
    .instrument(span)
    .await;

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
