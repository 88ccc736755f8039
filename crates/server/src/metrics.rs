//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Pressroom server:
//! - HTTP request metrics (latency, counts, errors)
//! - Consumer and queue status (collected dynamically)
//! - Core counters registered from the core crate

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pressroom_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pressroom_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pressroom_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pressroom_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Consumer / Queue Metrics (collected dynamically)
// =============================================================================

/// Consumer running state (1 = running, 0 = stopped).
pub static CONSUMER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pressroom_consumer_running",
        "Whether the job consumer is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Renders currently in flight in the worker pool.
pub static CONSUMER_ACTIVE_JOBS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pressroom_consumer_active_jobs",
        "Number of renders currently in flight",
    )
    .unwrap()
});

/// Messages waiting on the queue.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("pressroom_queue_depth", "Messages waiting on the job queue").unwrap()
});

/// Messages parked in the dead-letter store.
pub static DEAD_LETTERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pressroom_dead_lettered",
        "Messages parked in the dead-letter store",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Consumer / queue
    registry
        .register(Box::new(CONSUMER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(CONSUMER_ACTIVE_JOBS.clone()))
        .unwrap();
    registry.register(Box::new(QUEUE_DEPTH.clone())).unwrap();
    registry.register(Box::new(DEAD_LETTERED.clone())).unwrap();

    // Core metrics (tickets, dedup, jobs, artifacts)
    for metric in pressroom_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding metrics to update gauges with current values
/// from the consumer and queue.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.consumer().status().await;
    CONSUMER_RUNNING.set(if status.running { 1 } else { 0 });
    CONSUMER_ACTIVE_JOBS.set(status.active_jobs as i64);
    QUEUE_DEPTH.set(status.queue.queued as i64);
    DEAD_LETTERED.set(status.queue.dead_lettered as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/artifacts/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/artifacts/{id}");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/artifacts/12345";
        assert_eq!(normalize_path(path), "/api/v1/artifacts/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("pressroom_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Touch gauges so they appear in output.
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        CONSUMER_RUNNING.set(0);
        CONSUMER_ACTIVE_JOBS.set(0);
        QUEUE_DEPTH.set(0);
        DEAD_LETTERED.set(0);

        let output = encode_metrics();
        assert!(output.contains("pressroom_http_request_duration_seconds"));
        assert!(output.contains("pressroom_http_requests_in_flight"));
        assert!(output.contains("pressroom_consumer_running"));
        assert!(output.contains("pressroom_queue_depth"));
        assert!(output.contains("pressroom_dead_lettered"));
    }
}
