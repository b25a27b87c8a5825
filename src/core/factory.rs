//! Application Factory
//!
//! Builds the AppState for the storage backend named in the configuration.
//! Handlers are generic over the store, so the choice is resolved here once
//! and carried as an enum.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use crate::core::app_state::AppState;
use crate::core::config::{Config, StorageType};
use crate::core::error::Result;
use crate::storage::{MemStore, MongoStore};

/// Enum to hold different AppState configurations
pub enum ConfiguredAppState {
    /// In-process collections
    Memory(Arc<AppState<MemStore>>),
    /// MongoDB-backed collections
    Mongo(Arc<AppState<MongoStore>>),
}

impl ConfiguredAppState {
    /// Get the HTTP address from config
    pub fn http_addr(&self) -> SocketAddr {
        self.config().server.http_addr
    }

    /// Configuration the state was built from
    pub fn config(&self) -> &Config {
        match self {
            ConfiguredAppState::Memory(state) => &state.config,
            ConfiguredAppState::Mongo(state) => &state.config,
        }
    }

    /// Storage backend name
    pub fn backend_name(&self) -> &'static str {
        match self {
            ConfiguredAppState::Memory(_) => "memory",
            ConfiguredAppState::Mongo(_) => "mongo",
        }
    }
}

/// Create AppState based on configuration
pub async fn create_app_state(config: Config) -> Result<ConfiguredAppState> {
    info!("Creating AppState with storage type: {:?}", config.storage.storage_type);

    match config.storage.storage_type {
        StorageType::Memory => {
            let store = Arc::new(MemStore::new());
            info!("MemStore initialized");
            Ok(ConfiguredAppState::Memory(Arc::new(AppState::new(store, config))))
        }
        StorageType::Mongo => {
            let store = MongoStore::connect(&config.storage.mongo, &config.storage.database).await?;
            info!(
                uri = %config.storage.mongo.uri,
                database = %config.storage.database,
                "MongoStore initialized"
            );
            Ok(ConfiguredAppState::Mongo(Arc::new(AppState::new(Arc::new(store), config))))
        }
    }
}
