//! MongoDB document store
//!
//! Thin adapter over the official async driver. The driver pools connections
//! and is safe to share, so one `MongoStore` serves every request.

use std::path::Path;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Collection, Database};
use tracing::info;
use crate::core::config::MongoConfig;
use crate::core::error::{Error, Result, StoreError};
use crate::core::ids::RecordId;
use crate::storage::{DocumentStore, StoreResult, ID_FIELD};

/// MongoDB-backed document store
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect using the given settings.
    ///
    /// The driver connects lazily; this only parses options and builds the
    /// client, so an unreachable server shows up on the first operation.
    pub async fn connect(config: &MongoConfig, database: &str) -> Result<Self> {
        let options = client_options(config).await?;
        let client = Client::with_options(options).map_err(StoreError::from)?;
        info!(database, "MongoDB client created");
        Ok(Self::from_database(client.database(database)))
    }

    /// Wrap an existing database handle
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

/// Build driver options from configuration, including credentials from file
pub async fn client_options(config: &MongoConfig) -> Result<ClientOptions> {
    let mut options = ClientOptions::parse(&config.uri)
        .await
        .map_err(|e| Error::config(format!("Invalid MongoDB URI: {}", e)))?;

    options.app_name = Some(config.app_name.clone());
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);

    if let Some(path) = &config.credentials_file {
        let (username, password) = read_credentials(path)?;
        options.credential = Some(
            Credential::builder()
                .username(username)
                .password(password)
                .build(),
        );
    }

    Ok(options)
}

/// Read `username:password` from the first line of a file
pub fn read_credentials(path: &Path) -> Result<(String, String)> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read credentials file {:?}: {}", path, e))
    })?;
    let line = contents.lines().next().unwrap_or("").trim();

    match line.split_once(':') {
        Some((user, pass)) if !user.is_empty() => Ok((user.to_string(), pass.to_string())),
        _ => Err(Error::config(format!(
            "Credentials file {:?} must start with a username:password line",
            path
        ))),
    }
}

fn by_id(id: RecordId) -> Document {
    doc! { "_id": id.as_object_id() }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, mut fields: Document) -> StoreResult<RecordId> {
        fields.remove(ID_FIELD);
        let result = self.collection(collection).insert_one(fields).await?;
        result
            .inserted_id
            .as_object_id()
            .map(RecordId::from)
            .ok_or_else(|| {
                StoreError::Unexpected(format!("inserted id is not an ObjectId: {}", result.inserted_id))
            })
    }

    async fn find_one(&self, collection: &str, id: RecordId) -> StoreResult<Option<Document>> {
        Ok(self.collection(collection).find_one(by_id(id)).await?)
    }

    async fn find_many(&self, collection: &str, limit: usize) -> StoreResult<Vec<Document>> {
        // The driver treats a zero limit as "no limit".
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let cursor = self.collection(collection).find(doc! {}).limit(limit).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn replace_one(&self, collection: &str, id: RecordId, mut fields: Document) -> StoreResult<bool> {
        fields.remove(ID_FIELD);
        let result = self.collection(collection).replace_one(by_id(id), fields).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, collection: &str, id: RecordId) -> StoreResult<bool> {
        let result = self.collection(collection).delete_one(by_id(id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }
}
