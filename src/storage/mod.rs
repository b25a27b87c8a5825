//! Storage layer for Asset Vault
//!
//! This module provides the document store abstraction that the repositories
//! are written against, plus its two backends:
//! - `MemStore`: in-process collections, used by tests and local runs
//! - `MongoStore`: MongoDB through the official async driver
//!
//! Every operation is a single-document primitive (or a bounded scan); the
//! layer above never needs multi-document transactions.

use async_trait::async_trait;
use mongodb::bson::Document;
use crate::core::error::StoreError;
use crate::core::ids::RecordId;

/// In-memory document store
pub mod mem_store;

/// MongoDB document store
pub mod mongo_store;

pub use mem_store::MemStore;
pub use mongo_store::MongoStore;

/// Result type of store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Field holding the identifier in every stored document
pub const ID_FIELD: &str = "_id";

/// Trait for document store implementations
///
/// Documents are BSON documents. Stored documents carry their identifier in
/// `_id`; documents passed in for insert or replace must not.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the identifier the store assigned
    async fn insert_one(&self, collection: &str, fields: Document) -> StoreResult<RecordId>;

    /// Fetch one document by identifier
    async fn find_one(&self, collection: &str, id: RecordId) -> StoreResult<Option<Document>>;

    /// Fetch up to `limit` documents in store-native order; a zero limit
    /// yields nothing
    async fn find_many(&self, collection: &str, limit: usize) -> StoreResult<Vec<Document>>;

    /// Replace every field of a document, keeping its identifier.
    ///
    /// Returns `false` when no document has that identifier.
    async fn replace_one(&self, collection: &str, id: RecordId, fields: Document) -> StoreResult<bool>;

    /// Delete a document. Returns `false` when no document has that identifier.
    async fn delete_one(&self, collection: &str, id: RecordId) -> StoreResult<bool>;

    /// Round-trip to the backend to check it is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Short backend name for logs and the info endpoint
    fn backend_name(&self) -> &'static str;
}

/// Helper trait that combines all requirements for storage implementations
/// This cleans up generic bounds throughout the codebase
pub trait StorageImpl: DocumentStore + Send + Sync + 'static {}

/// Blanket implementation for any type that meets the requirements
impl<T> StorageImpl for T where T: DocumentStore + Send + Sync + 'static {}
