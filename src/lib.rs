//! Asset Vault - storage service for game sprites, audio clips and player scores
//!
//! Binary assets are uploaded as multipart files and stored as documents
//! holding the filename and raw bytes; reads return the bytes hex-encoded.
//! Player scores are validated, sanitized and stored as small documents. Both
//! run over a `DocumentStore`, backed by MongoDB in production and by an
//! in-process store for tests and local runs.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod storage;
pub mod repository;
pub mod api;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, RecordId, Result};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging and metrics from configuration
pub fn init(config: &Config) -> Result<()> {
    crate::core::logging::init_logging(&config.logging)?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    system::metrics::init_registry();
    if !config.metrics.enable_prometheus {
        tracing::info!("Prometheus endpoint disabled; metrics are recorded but not exposed");
    }

    Ok(())
}
