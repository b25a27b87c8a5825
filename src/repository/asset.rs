//! Binary asset repository
//!
//! One implementation serves both sprites and audio; the `AssetKind` supplies
//! the collection, the extension allow-list and the response wording.

use std::sync::Arc;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{doc, Binary, Bson, Document};
use tracing::{debug, info, warn};
use crate::core::codec;
use crate::core::error::{Error, Result, StoreError};
use crate::core::ids::RecordId;
use crate::core::types::{AssetKind, AssetView};
use crate::core::validation::validate_asset_upload;
use crate::repository::effective_limit;
use crate::storage::{StorageImpl, StoreResult, ID_FIELD};
use crate::system::metrics::Timer;

/// CRUD over binary-asset documents of one kind
pub struct AssetRepository<S: StorageImpl> {
    store: Arc<S>,
    kind: AssetKind,
    list_limit: usize,
}

impl<S: StorageImpl> AssetRepository<S> {
    /// Create a repository over `store` for the given asset kind.
    /// `list_limit` caps every listing.
    pub fn new(store: Arc<S>, kind: AssetKind, list_limit: usize) -> Self {
        Self {
            store,
            kind,
            list_limit,
        }
    }

    /// The asset kind this repository serves
    pub fn kind(&self) -> &AssetKind {
        &self.kind
    }

    /// Validate and insert a new asset, returning its identifier
    pub async fn create(&self, filename: &str, content: Vec<u8>) -> Result<RecordId> {
        let timer = Timer::start(self.kind.collection, "create");
        let result: Result<RecordId> = async {
            validate_asset_upload(filename, &content, self.kind.allowed_extensions)?;
            let size = content.len();
            let id = self
                .store
                .insert_one(self.kind.collection, asset_document(filename, content))
                .await?;
            info!(collection = self.kind.collection, %id, filename, size, "Asset created");
            Ok(id)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// List up to `limit` assets (never more than the configured cap)
    pub async fn list_all(&self, limit: Option<usize>) -> Result<Vec<AssetView>> {
        let timer = Timer::start(self.kind.collection, "list");
        let limit = effective_limit(limit, self.list_limit);
        let result: Result<Vec<AssetView>> = async {
            if limit == 0 {
                return Ok(Vec::new());
            }
            let docs = self.store.find_many(self.kind.collection, limit).await?;
            let views = docs
                .into_iter()
                .filter_map(|doc| match asset_view(self.kind.collection, &doc) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        warn!(collection = self.kind.collection, error = %e, "Skipping unreadable asset");
                        None
                    }
                })
                .collect::<Vec<_>>();
            debug!(collection = self.kind.collection, count = views.len(), limit, "Assets listed");
            Ok(views)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Fetch one asset by its textual identifier
    pub async fn get(&self, id_text: &str) -> Result<AssetView> {
        let timer = Timer::start(self.kind.collection, "get");
        let result: Result<AssetView> = async {
            let id = RecordId::parse(id_text)?;
            let doc = self
                .store
                .find_one(self.kind.collection, id)
                .await?
                .ok_or_else(|| Error::not_found(self.kind.entity))?;
            Ok(asset_view(self.kind.collection, &doc)?)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Replace filename and content of an existing asset
    pub async fn update(&self, id_text: &str, filename: &str, content: Vec<u8>) -> Result<()> {
        let timer = Timer::start(self.kind.collection, "update");
        let result: Result<()> = async {
            let id = RecordId::parse(id_text)?;
            validate_asset_upload(filename, &content, self.kind.allowed_extensions)?;
            let matched = self
                .store
                .replace_one(self.kind.collection, id, asset_document(filename, content))
                .await?;
            if !matched {
                return Err(Error::not_found(self.kind.entity));
            }
            info!(collection = self.kind.collection, %id, filename, "Asset replaced");
            Ok(())
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Delete an asset
    pub async fn delete(&self, id_text: &str) -> Result<()> {
        let timer = Timer::start(self.kind.collection, "delete");
        let result: Result<()> = async {
            let id = RecordId::parse(id_text)?;
            if !self.store.delete_one(self.kind.collection, id).await? {
                return Err(Error::not_found(self.kind.entity));
            }
            info!(collection = self.kind.collection, %id, "Asset deleted");
            Ok(())
        }
        .await;
        timer.finish(&result);
        result
    }
}

fn asset_document(filename: &str, content: Vec<u8>) -> Document {
    doc! {
        "filename": filename,
        "content": Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: content,
        }),
    }
}

fn asset_view(collection: &str, doc: &Document) -> StoreResult<AssetView> {
    let id = doc
        .get_object_id(ID_FIELD)
        .map_err(|e| StoreError::corrupt(collection, format!("_id: {}", e)))?;
    let filename = doc
        .get_str("filename")
        .map_err(|e| StoreError::corrupt(collection, format!("filename: {}", e)))?;
    let content = match doc.get("content") {
        Some(Bson::Binary(binary)) => codec::encode(&binary.bytes),
        Some(other) => {
            return Err(StoreError::corrupt(
                collection,
                format!("content has type {:?}", other.element_type()),
            ))
        }
        None => return Err(StoreError::corrupt(collection, "content missing")),
    };

    Ok(AssetView {
        id: id.into(),
        filename: filename.to_string(),
        content,
    })
}
