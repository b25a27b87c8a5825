//! Binary content codec
//!
//! Asset bytes are stored natively by the document store and travel over
//! JSON as lowercase hex.

use crate::core::error::{Error, Result};

/// Encode raw bytes as lowercase hex. Output is twice the input length.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex text back to bytes.
///
/// Fails with `InvalidEncoding` on odd length or non-hex characters.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| Error::InvalidEncoding(e.to_string()))
}
