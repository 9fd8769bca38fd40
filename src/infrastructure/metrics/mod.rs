//! Prometheus Metrics Module
//!
//! Application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Document store operation latency by collection and operation
//! - Error responses by error kind

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "portfolio_admin";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Store operation latency histogram
pub static STORE_OPERATION_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];
    HistogramVec::new(
        HistogramOpts::new(
            "store_operation_duration_seconds",
            "Document store operation latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["operation", "collection"],
    )
    .expect("Failed to create STORE_OPERATION_DURATION_SECONDS metric")
});

/// Error responses by kind (VALIDATION, NOT_FOUND, ...)
pub static APP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("app_errors_total", "Total number of error responses").namespace(NAMESPACE),
        &["kind"],
    )
    .expect("Failed to create APP_ERRORS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(STORE_OPERATION_DURATION_SECONDS.clone()))
        .expect("Failed to register STORE_OPERATION_DURATION_SECONDS");
    registry
        .register(Box::new(APP_ERRORS_TOTAL.clone()))
        .expect("Failed to register APP_ERRORS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record store operation metrics
pub fn record_store_operation(operation: &str, collection: &str, duration_secs: f64) {
    STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation, collection])
        .observe(duration_secs);
}

/// Count an error response of the given kind
pub fn record_error(kind: &str) {
    APP_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}
