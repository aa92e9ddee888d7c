//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Worker pool (conversion attempts, durations, bulk runs)
//! - Conversion service (capability loads)
//! - Bulk downloads (deliveries)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Worker Pool Metrics
// =============================================================================

/// Conversion attempts total by result.
pub static CONVERSION_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pixferry_conversion_attempts_total",
            "Total conversion attempts",
        ),
        &["result"], // "done", "failed", "skipped"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pixferry_conversion_duration_seconds",
            "Duration of a single conversion request",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

/// Bulk conversion runs started total.
pub static BULK_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pixferry_bulk_runs_total",
        "Total bulk conversion runs started",
    )
    .unwrap()
});

// =============================================================================
// Conversion Service Metrics
// =============================================================================

/// Capability load attempts total by result.
pub static CAPABILITY_LOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pixferry_capability_loads_total",
            "Total format capability load attempts",
        ),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloads delivered total.
pub static DOWNLOADS_DELIVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pixferry_downloads_delivered_total",
        "Total converted files delivered",
    )
    .unwrap()
});

/// Download delivery failures total.
pub static DOWNLOADS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pixferry_downloads_failed_total",
        "Total delivery failures",
    )
    .unwrap()
});

/// Get all metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pool
        Box::new(CONVERSION_ATTEMPTS.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(BULK_RUNS.clone()),
        // Service
        Box::new(CAPABILITY_LOADS.clone()),
        // Downloads
        Box::new(DOWNLOADS_DELIVERED.clone()),
        Box::new(DOWNLOADS_FAILED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }

    #[test]
    fn test_conversion_attempts_labels() {
        CONVERSION_ATTEMPTS.with_label_values(&["done"]).inc();
        assert!(CONVERSION_ATTEMPTS.with_label_values(&["done"]).get() >= 1);
    }
}
