//! Error types and handling for Asset Vault
//!
//! This module defines all error types used throughout the service. The HTTP
//! layer maps each variant to a status code; everything below it only ever
//! returns these types.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Asset Vault
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected by the validation rules
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Identifier text that is not a valid store identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Text that is not a valid hex encoding
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// No document matches the given identifier
    #[error("{entity} not found")]
    NotFound {
        /// Human label of the missing entity ("Sprite", "Score", ...)
        entity: &'static str,
    },

    /// Document store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Rejections produced by the validation rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Uploaded file had no bytes
    #[error("Empty file")]
    EmptyContent,

    /// Filename does not end with an allowed extension
    #[error("Invalid file type")]
    UnsupportedExtension {
        /// The rejected filename
        filename: String,
    },

    /// Player name missing or empty
    #[error("Player name is required")]
    MissingName,

    /// Player name consisted only of disallowed characters
    #[error("Player name must contain letters, digits or spaces")]
    NameEmptyAfterSanitization,

    /// Score was not a JSON integer
    #[error("Score must be an integer")]
    NonIntegerScore,

    /// Score was below zero
    #[error("Score must be non-negative")]
    NegativeScore,

    /// Score does not fit a signed 64-bit integer
    #[error("Score is out of range")]
    ScoreOutOfRange,
}

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// MongoDB driver failure
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A stored document does not have the expected shape
    #[error("Corrupt document in {collection}: {reason}")]
    Corrupt {
        /// Collection holding the document
        collection: String,
        /// What was wrong with it
        reason: String,
    },

    /// The backend returned something the adapter cannot interpret
    #[error("Unexpected store response: {0}")]
    Unexpected(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(text: impl Into<String>) -> Self {
        Self::InvalidIdentifier(text.into())
    }

    /// Create a not found error for the given entity label
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidIdentifier(_)
                | Error::InvalidEncoding(_)
                | Error::NotFound { .. }
        )
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

impl StoreError {
    /// Create a corruption error for a document in `collection`
    pub fn corrupt(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}
