//! Metrics collection for Asset Vault
//!
//! Store operations are counted by collection, operation and outcome, and
//! timed per collection and operation. Everything is registered in a
//! crate-owned registry so tests and embedders never collide with the default
//! Prometheus registry.

use crate::core::error::{Error, Result};
use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Instant;

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Outcome label values
pub mod outcome {
    /// Operation succeeded
    pub const OK: &str = "ok";
    /// Input rejected (validation, bad identifier)
    pub const REJECTED: &str = "rejected";
    /// Target document did not exist
    pub const NOT_FOUND: &str = "not_found";
    /// Store failure
    pub const ERROR: &str = "error";
}

/// Store operation metrics
pub struct Metrics {
    /// Total store operations by collection, operation and outcome
    pub operations: IntCounterVec,
    /// Duration of store operations in seconds
    pub operation_duration: HistogramVec,
}

impl Metrics {
    /// Create metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let operations = IntCounterVec::new(
            Opts::new("av_store_operations_total", "Total number of store operations"),
            &["collection", "operation", "outcome"],
        )?;
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "av_store_operation_duration_seconds",
                "Duration of store operations in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["collection", "operation"],
        )?;

        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            operations,
            operation_duration,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new(registry()).expect("metric names are static and registered once")
        });
        &INSTANCE
    }

    /// Count one operation
    pub fn record(&self, collection: &str, operation: &str, outcome: &str) {
        self.operations
            .with_label_values(&[collection, operation, outcome])
            .inc();
    }

    /// Current count for a label combination
    pub fn count(&self, collection: &str, operation: &str, outcome: &str) -> u64 {
        self.operations
            .with_label_values(&[collection, operation, outcome])
            .get()
    }
}

/// Outcome label for an operation result
pub fn outcome_of<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => outcome::OK,
        Err(Error::NotFound { .. }) => outcome::NOT_FOUND,
        Err(e) if e.is_client_error() => outcome::REJECTED,
        Err(_) => outcome::ERROR,
    }
}

/// Timer for measuring operation duration with automatic histogram recording
pub struct Timer {
    /// Start time of the operation
    start: Instant,
    collection: &'static str,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer
    pub fn start(collection: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            collection,
            operation,
        }
    }

    /// Record the elapsed time and the outcome of `result`, consuming the timer
    pub fn finish<T>(self, result: &Result<T>) {
        let metrics = Metrics::global();
        metrics
            .operation_duration
            .with_label_values(&[self.collection, self.operation])
            .observe(self.start.elapsed().as_secs_f64());
        metrics.record(self.collection, self.operation, outcome_of(result));
    }
}

/// Initialize the metrics registry by creating the global metrics instance
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Get the Prometheus registry for serving metrics
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Collect and return all metrics as a Prometheus-formatted string
pub fn collect_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = registry().gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}
