//! System utilities and monitoring
//!
//! Prometheus metrics for store operations.

pub mod metrics;
