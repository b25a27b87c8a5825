//! In-memory document store using DashMap
//!
//! Each collection is an ordered map keyed by identifier. ObjectIds start with
//! a timestamp, so iteration order roughly follows insertion order, which is
//! close to what MongoDB returns for an unsorted scan.

use std::collections::BTreeMap;
use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::{Bson, Document};
use tracing::debug;
use crate::core::ids::RecordId;
use crate::storage::{DocumentStore, StoreResult, ID_FIELD};

/// Simple storage implementation using DashMap and BSON documents
pub struct MemStore {
    /// Map of collection name to its documents (without `_id`)
    collections: DashMap<String, BTreeMap<RecordId, Document>>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    /// Number of documents in a collection
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    /// Attach the identifier as the leading `_id` field
    fn with_id(id: RecordId, fields: &Document) -> Document {
        let mut doc = Document::new();
        doc.insert(ID_FIELD, Bson::ObjectId(id.into()));
        for (key, value) in fields {
            if key != ID_FIELD {
                doc.insert(key.clone(), value.clone());
            }
        }
        doc
    }

    fn strip_id(mut fields: Document) -> Document {
        fields.remove(ID_FIELD);
        fields
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn insert_one(&self, collection: &str, fields: Document) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        docs.insert(id, Self::strip_id(fields));
        debug!(collection, %id, count = docs.len(), "MemStore insert");
        Ok(id)
    }

    async fn find_one(&self, collection: &str, id: RecordId) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(&id).map(|fields| Self::with_id(id, fields))))
    }

    async fn find_many(&self, collection: &str, limit: usize) -> StoreResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .take(limit)
                    .map(|(id, fields)| Self::with_id(*id, fields))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace_one(&self, collection: &str, id: RecordId, fields: Document) -> StoreResult<bool> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.get_mut(&id) {
            Some(existing) => {
                *existing = Self::strip_id(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, collection: &str, id: RecordId) -> StoreResult<bool> {
        Ok(self
            .collections
            .get_mut(collection)
            .map(|mut docs| docs.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
