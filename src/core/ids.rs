//! Store identifiers and their string form.
//!
//! Records are keyed by the document store's 12-byte ObjectId. Over HTTP the
//! identifier travels as 24 lowercase hex characters; this module is the only
//! place that converts between the two.

use std::fmt;
use std::str::FromStr;
use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use crate::core::error::{Error, Result};

/// Length of the textual form of a record identifier
pub const RECORD_ID_TEXT_LENGTH: usize = 24;

/// Store-assigned identifier of a document.
///
/// Memory Layout:
/// - [u8; 12] - ObjectId bytes (timestamp, random value, counter)
///
/// Never client-supplied on create; immutable once assigned.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(ObjectId);

impl RecordId {
    /// Generate a fresh identifier, as the store would on insert
    pub fn generate() -> Self {
        RecordId(ObjectId::new())
    }

    /// Parse the textual form. Fails with `InvalidIdentifier` unless `text`
    /// is exactly 24 hexadecimal characters.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != RECORD_ID_TEXT_LENGTH {
            return Err(Error::invalid_identifier(text));
        }
        ObjectId::parse_str(text)
            .map(RecordId)
            .map_err(|_| Error::invalid_identifier(text))
    }

    /// Lowercase hex form. Inverse of [`RecordId::parse`].
    pub fn format(&self) -> String {
        self.0.to_hex()
    }

    /// Get the underlying ObjectId
    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    /// Get the underlying bytes
    pub fn bytes(&self) -> [u8; 12] {
        self.0.bytes()
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        RecordId(oid)
    }
}

impl From<RecordId> for ObjectId {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordId::parse(s)
    }
}

/// Identifiers are always rendered in their string form on the wire
impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
