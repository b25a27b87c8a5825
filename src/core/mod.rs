//! Core system types and foundations
//!
//! This module contains the fundamental building blocks of Asset Vault:
//! identifiers, validation rules, configuration, error handling and the
//! application state assembled from them.

pub mod app_state;
pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod ids;
pub mod logging;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use app_state::AppState;
pub use config::Config;
pub use error::{Error, Result, StoreError, ValidationError};
pub use ids::RecordId;
pub use types::{AssetKind, AssetView, ScoreSubmission, ScoreView};
