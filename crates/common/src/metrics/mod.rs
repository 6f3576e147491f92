//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarFlow metrics
pub const METRICS_PREFIX: &str = "scholarflow";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Buckets for payment gateway round-trips (typically slower)
pub const GATEWAY_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Workflow metrics
    describe_counter!(
        format!("{}_manuscripts_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total manuscripts submitted"
    );

    describe_counter!(
        format!("{}_transitions_total", METRICS_PREFIX),
        Unit::Count,
        "Total workflow state transitions applied"
    );

    describe_counter!(
        format!("{}_transitions_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Total workflow transitions rejected as illegal"
    );

    describe_counter!(
        format!("{}_reviews_recorded_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviewer evaluations recorded"
    );

    describe_counter!(
        format!("{}_rounds_closed_total", METRICS_PREFIX),
        Unit::Count,
        "Total review rounds closed with an aggregate decision"
    );

    // Payment metrics
    describe_counter!(
        format!("{}_checkouts_initiated_total", METRICS_PREFIX),
        Unit::Count,
        "Total payment checkouts initiated"
    );

    describe_counter!(
        format!("{}_payments_verified_total", METRICS_PREFIX),
        Unit::Count,
        "Total payments verified"
    );

    describe_counter!(
        format!("{}_payments_failed_total", METRICS_PREFIX),
        Unit::Count,
        "Total payment verifications that failed"
    );

    describe_histogram!(
        format!("{}_gateway_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Payment gateway round-trip latency in seconds"
    );

    // Store metrics
    describe_gauge!(
        format!("{}_manuscripts_total", METRICS_PREFIX),
        Unit::Count,
        "Number of manuscripts in the store"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record an applied workflow transition
pub fn record_transition(from: &str, to: &str) {
    counter!(
        format!("{}_transitions_total", METRICS_PREFIX),
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// Record a rejected workflow transition
pub fn record_rejected_transition(from: &str, attempted: &str) {
    counter!(
        format!("{}_transitions_rejected_total", METRICS_PREFIX),
        "from" => from.to_string(),
        "attempted" => attempted.to_string()
    )
    .increment(1);
}

/// Update the stored-manuscript gauge
pub fn set_manuscript_count(count: usize) {
    gauge!(format!("{}_manuscripts_total", METRICS_PREFIX)).set(count as f64);
}

/// Record a payment gateway round-trip
pub fn record_gateway_call(operation: &str, duration_secs: f64) {
    histogram!(
        format!("{}_gateway_duration_seconds", METRICS_PREFIX),
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}
