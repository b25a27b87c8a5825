//! Application State Management
//!
//! This module defines the central AppState that holds the store, the
//! repositories built on it and the configuration. The factory builds it once
//! at startup; handlers share it behind an `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::core::config::Config;
use crate::core::types::AssetKind;
use crate::repository::{AssetRepository, ScoreRepository};
use crate::storage::StorageImpl;

/// Central application state holding all services and components
pub struct AppState<S: StorageImpl> {
    /// Document store shared by the repositories
    pub store: Arc<S>,

    /// Sprite images
    pub sprites: AssetRepository<S>,

    /// Audio clips
    pub audio: AssetRepository<S>,

    /// Player scores
    pub scores: ScoreRepository<S>,

    /// Application configuration
    pub config: Config,

    started_at: Instant,
}

impl<S: StorageImpl> AppState<S> {
    /// Create a new AppState with the given store and configuration
    pub fn new(store: Arc<S>, config: Config) -> Self {
        let limit = config.storage.list_limit;
        Self {
            sprites: AssetRepository::new(store.clone(), AssetKind::SPRITE, limit),
            audio: AssetRepository::new(store.clone(), AssetKind::AUDIO, limit),
            scores: ScoreRepository::new(store.clone(), limit),
            store,
            config,
            started_at: Instant::now(),
        }
    }

    /// Time since the state was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
