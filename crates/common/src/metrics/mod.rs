//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PaperHub metrics
pub const METRICS_PREFIX: &str = "paperhub";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
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

    describe_counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        Unit::Count,
        "Requests rejected by a rate limiter"
    );

    // Domain metrics
    describe_counter!(
        format!("{}_papers_published_total", METRICS_PREFIX),
        Unit::Count,
        "Papers moved from draft to published"
    );

    describe_counter!(
        format!("{}_comments_total", METRICS_PREFIX),
        Unit::Count,
        "Comments posted"
    );

    describe_counter!(
        format!("{}_reviews_total", METRICS_PREFIX),
        Unit::Count,
        "Reviews submitted"
    );

    describe_counter!(
        format!("{}_authorship_claims_total", METRICS_PREFIX),
        Unit::Count,
        "Authorship claims accepted"
    );

    // Import metrics
    describe_counter!(
        format!("{}_articles_imported_total", METRICS_PREFIX),
        Unit::Count,
        "Articles inserted by the importer"
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

/// Count a request turned away by a limiter
pub fn record_rate_limited(limiter: &str) {
    counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        "limiter" => limiter.to_string()
    )
    .increment(1);
}

pub fn record_paper_published() {
    counter!(format!("{}_papers_published_total", METRICS_PREFIX)).increment(1);
}

pub fn record_comment() {
    counter!(format!("{}_comments_total", METRICS_PREFIX)).increment(1);
}

pub fn record_review(recommendation: Option<&str>) {
    counter!(
        format!("{}_reviews_total", METRICS_PREFIX),
        "recommendation" => recommendation.unwrap_or("none").to_string()
    )
    .increment(1);
}

pub fn record_claim() {
    counter!(format!("{}_authorship_claims_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record import results
pub fn record_articles_imported(source: &str, inserted: u64) {
    counter!(
        format!("{}_articles_imported_total", METRICS_PREFIX),
        "source" => source.to_string()
    )
    .increment(inserted);
}
