//! Transaction request instruments.
//!
//! - `transaction_request_duration_seconds`: histogram, default buckets
//! - `transaction_requests_success_total`: counter
//! - `transaction_requests_errors_total`: counter
//!
//! Instruments live in a [`Registry`] owned by [`PrometheusMetrics`], built once
//! at startup and threaded through [`AppState`](crate::AppState).

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::time::{Duration, Instant};

use crate::AppState;

/// Sink for the three transaction instruments. Implementations must tolerate
/// concurrent calls without losing updates.
pub trait TransactionMetrics: Send + Sync {
    fn observe_duration(&self, elapsed: Duration);

    fn record_success(&self);

    fn record_error(&self);

    /// Text exposition for `GET /metrics`.
    fn render(&self) -> Result<String, prometheus::Error> {
        Ok(String::new())
    }
}

/// Discards everything. Used where emission must be suppressed, e.g. tests
/// asserting on responses only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl TransactionMetrics for NoopMetrics {
    fn observe_duration(&self, _elapsed: Duration) {}

    fn record_success(&self) {}

    fn record_error(&self) {}
}

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    request_duration: Histogram,
    request_success: IntCounter,
    request_errors: IntCounter,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let request_duration = Histogram::with_opts(HistogramOpts::new(
            "transaction_request_duration_seconds",
            "Time taken to process transaction requests",
        ))?;
        let request_success = IntCounter::new(
            "transaction_requests_success_total",
            "Total number of successful transaction requests",
        )?;
        let request_errors = IntCounter::new(
            "transaction_requests_errors_total",
            "Total number of failed transaction requests",
        )?;

        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(request_success.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry,
            request_duration,
            request_success,
            request_errors,
        })
    }

    pub fn success_count(&self) -> u64 {
        self.request_success.get()
    }

    pub fn error_count(&self) -> u64 {
        self.request_errors.get()
    }

    pub fn duration_samples(&self) -> u64 {
        self.request_duration.get_sample_count()
    }
}

impl TransactionMetrics for PrometheusMetrics {
    fn observe_duration(&self, elapsed: Duration) {
        self.request_duration.observe(elapsed.as_secs_f64());
    }

    fn record_success(&self) {
        self.request_success.inc();
    }

    fn record_error(&self) {
        self.request_errors.inc();
    }

    fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Observes the elapsed time on drop, so a handler records exactly one
/// duration whichever way it exits, including when its future is dropped.
pub struct RequestTimer<'a> {
    metrics: &'a dyn TransactionMetrics,
    start: Instant,
}

impl<'a> RequestTimer<'a> {
    pub fn start(metrics: &'a dyn TransactionMetrics) -> Self {
        Self {
            metrics,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer<'_> {
    fn drop(&mut self) {
        self.metrics.observe_duration(self.start.elapsed());
    }
}

/// Guarantees exactly one of the success/error counters moves per request.
///
/// Settle it with [`RequestOutcome::success`] or [`RequestOutcome::error`].
/// If it is dropped unsettled (the handler future was cancelled mid-flight)
/// it counts an error and logs the cancellation.
pub struct RequestOutcome<'a> {
    metrics: &'a dyn TransactionMetrics,
    settled: bool,
}

impl<'a> RequestOutcome<'a> {
    pub fn start(metrics: &'a dyn TransactionMetrics) -> Self {
        Self {
            metrics,
            settled: false,
        }
    }

    pub fn success(mut self) {
        self.settled = true;
        self.metrics.record_success();
    }

    pub fn error(mut self) {
        self.settled = true;
        self.metrics.record_error();
    }
}

impl Drop for RequestOutcome<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.metrics.record_error();
            tracing::error!("request cancelled before store insert completed");
        }
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_start_at_zero() {
        let metrics = PrometheusMetrics::new().unwrap();
        assert_eq!(metrics.success_count(), 0);
        assert_eq!(metrics.error_count(), 0);
        assert_eq!(metrics.duration_samples(), 0);
    }

    #[test]
    fn registries_are_independent() {
        let first = PrometheusMetrics::new().unwrap();
        let second = PrometheusMetrics::new().unwrap();

        first.record_success();

        assert_eq!(first.success_count(), 1);
        assert_eq!(second.success_count(), 0);
    }

    #[test]
    fn timer_observes_once_on_drop() {
        let metrics = PrometheusMetrics::new().unwrap();
        {
            let _timer = RequestTimer::start(&metrics);
        }
        assert_eq!(metrics.duration_samples(), 1);
    }

    #[test]
    fn outcome_counts_exactly_once() {
        let metrics = PrometheusMetrics::new().unwrap();

        RequestOutcome::start(&metrics).success();
        RequestOutcome::start(&metrics).error();

        assert_eq!(metrics.success_count(), 1);
        assert_eq!(metrics.error_count(), 1);
    }

    #[test]
    fn unsettled_outcome_counts_an_error() {
        let metrics = PrometheusMetrics::new().unwrap();
        {
            let _outcome = RequestOutcome::start(&metrics);
        }
        assert_eq!(metrics.success_count(), 0);
        assert_eq!(metrics.error_count(), 1);
    }

    #[test]
    fn render_exposes_metric_names() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_error();
        metrics.observe_duration(Duration::from_millis(3));

        let text = metrics.render().unwrap();
        assert!(text.contains("transaction_requests_errors_total 1"));
        assert!(text.contains("transaction_requests_success_total 0"));
        assert!(text.contains("transaction_request_duration_seconds_count 1"));
    }

    #[test]
    fn noop_renders_nothing() {
        assert_eq!(NoopMetrics.render().unwrap(), "");
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Arc::new(PrometheusMetrics::new().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_success();
                        metrics.record_error();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.success_count(), 8000);
        assert_eq!(metrics.error_count(), 8000);
    }
}
