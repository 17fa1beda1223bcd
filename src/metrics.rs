//! Refresh-cycle counters and latency histograms.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Completed refresh cycles counter metric name.
pub const METRIC_REFRESH_CYCLES: &str = "refresh_cycles_total";
/// Failed refresh cycles counter metric name.
pub const METRIC_REFRESH_FAILURES: &str = "refresh_failures_total";
/// External fetch failures counter metric name.
pub const METRIC_FETCH_FAILURES: &str = "external_fetch_failures_total";
/// End-to-end refresh latency metric name.
pub const METRIC_REFRESH_DURATION: &str = "refresh_duration_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_REFRESH_CYCLES,
        "Total number of completed refresh cycles"
    );
    describe_counter!(
        METRIC_REFRESH_FAILURES,
        "Total number of refresh cycles that failed"
    );
    describe_counter!(
        METRIC_FETCH_FAILURES,
        "Total number of external API fetch failures"
    );
    describe_histogram!(
        METRIC_REFRESH_DURATION,
        "End-to-end refresh cycle duration in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Increment the completed-refresh counter.
pub fn inc_refresh_cycles() {
    counter!(METRIC_REFRESH_CYCLES).increment(1);
}

/// Increment the failed-refresh counter.
pub fn inc_refresh_failures() {
    counter!(METRIC_REFRESH_FAILURES).increment(1);
}

/// Increment the fetch-failure counter, tagged with the upstream host.
pub fn inc_fetch_failures(origin: &str) {
    counter!(METRIC_FETCH_FAILURES, "origin" => origin.to_string()).increment(1);
}

/// Record how long a refresh cycle took.
pub fn record_refresh_duration(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_REFRESH_DURATION).record(latency_ms);
}
