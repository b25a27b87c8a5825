//! Player score repository

use std::sync::Arc;
use mongodb::bson::{doc, Bson, Document};
use tracing::{debug, info, warn};
use crate::core::error::{Error, Result, StoreError};
use crate::core::ids::RecordId;
use crate::core::types::{ScoreSubmission, ScoreView, SCORES_COLLECTION};
use crate::core::validation::prepare_score;
use crate::repository::effective_limit;
use crate::storage::{StorageImpl, StoreResult, ID_FIELD};
use crate::system::metrics::Timer;

const ENTITY: &str = "Score";

/// CRUD over player score documents
pub struct ScoreRepository<S: StorageImpl> {
    store: Arc<S>,
    list_limit: usize,
}

impl<S: StorageImpl> ScoreRepository<S> {
    /// Create a repository over `store`
    pub fn new(store: Arc<S>, list_limit: usize) -> Self {
        Self { store, list_limit }
    }

    /// Validate, sanitize and insert a score
    pub async fn create(&self, submission: &ScoreSubmission) -> Result<RecordId> {
        let timer = Timer::start(SCORES_COLLECTION, "create");
        let result: Result<RecordId> = async {
            let (player_name, score) = prepare_score(&submission.player_name, &submission.score)?;
            let id = self
                .store
                .insert_one(SCORES_COLLECTION, score_document(&player_name, score))
                .await?;
            info!(collection = SCORES_COLLECTION, %id, player_name = %player_name, score, "Score recorded");
            Ok(id)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// List up to `limit` scores (never more than the configured cap)
    pub async fn list_all(&self, limit: Option<usize>) -> Result<Vec<ScoreView>> {
        let timer = Timer::start(SCORES_COLLECTION, "list");
        let limit = effective_limit(limit, self.list_limit);
        let result: Result<Vec<ScoreView>> = async {
            if limit == 0 {
                return Ok(Vec::new());
            }
            let docs = self.store.find_many(SCORES_COLLECTION, limit).await?;
            let views = docs
                .iter()
                .filter_map(|doc| match score_view(doc) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        warn!(collection = SCORES_COLLECTION, error = %e, "Skipping unreadable score");
                        None
                    }
                })
                .collect::<Vec<_>>();
            debug!(collection = SCORES_COLLECTION, count = views.len(), limit, "Scores listed");
            Ok(views)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Fetch one score
    pub async fn get(&self, id_text: &str) -> Result<ScoreView> {
        let timer = Timer::start(SCORES_COLLECTION, "get");
        let result: Result<ScoreView> = async {
            let id = RecordId::parse(id_text)?;
            let doc = self
                .store
                .find_one(SCORES_COLLECTION, id)
                .await?
                .ok_or_else(|| Error::not_found(ENTITY))?;
            Ok(score_view(&doc)?)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Replace an existing score after the same checks as `create`
    pub async fn update(&self, id_text: &str, submission: &ScoreSubmission) -> Result<()> {
        let timer = Timer::start(SCORES_COLLECTION, "update");
        let result: Result<()> = async {
            let id = RecordId::parse(id_text)?;
            let (player_name, score) = prepare_score(&submission.player_name, &submission.score)?;
            let matched = self
                .store
                .replace_one(SCORES_COLLECTION, id, score_document(&player_name, score))
                .await?;
            if !matched {
                return Err(Error::not_found(ENTITY));
            }
            info!(collection = SCORES_COLLECTION, %id, player_name = %player_name, score, "Score replaced");
            Ok(())
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Delete a score
    pub async fn delete(&self, id_text: &str) -> Result<()> {
        let timer = Timer::start(SCORES_COLLECTION, "delete");
        let result: Result<()> = async {
            let id = RecordId::parse(id_text)?;
            if !self.store.delete_one(SCORES_COLLECTION, id).await? {
                return Err(Error::not_found(ENTITY));
            }
            info!(collection = SCORES_COLLECTION, %id, "Score deleted");
            Ok(())
        }
        .await;
        timer.finish(&result);
        result
    }
}

fn score_document(player_name: &str, score: i64) -> Document {
    doc! {
        "player_name": player_name,
        "score": score,
    }
}

// Older writers stored scores as 32-bit ints or whole doubles.
fn stored_score(value: Option<&Bson>) -> StoreResult<i64> {
    let corrupt = |reason: String| StoreError::corrupt(SCORES_COLLECTION, reason);
    let score = match value {
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Double(d)) if d.fract() == 0.0 && d.abs() < i64::MAX as f64 => *d as i64,
        Some(other) => return Err(corrupt(format!("score has type {:?}", other.element_type()))),
        None => return Err(corrupt("score missing".to_string())),
    };
    if score < 0 {
        return Err(corrupt(format!("score is negative ({score})")));
    }
    Ok(score)
}

fn score_view(doc: &Document) -> StoreResult<ScoreView> {
    let id = doc
        .get_object_id(ID_FIELD)
        .map_err(|e| StoreError::corrupt(SCORES_COLLECTION, format!("_id: {}", e)))?;
    let player_name = doc
        .get_str("player_name")
        .map_err(|e| StoreError::corrupt(SCORES_COLLECTION, format!("player_name: {}", e)))?;

    Ok(ScoreView {
        id: id.into(),
        player_name: player_name.to_string(),
        score: stored_score(doc.get("score"))?,
    })
}
