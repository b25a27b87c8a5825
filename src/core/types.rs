//! Domain types shared by the repositories and the HTTP layer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::core::ids::RecordId;

/// Name of the sprites collection
pub const SPRITES_COLLECTION: &str = "sprites";
/// Name of the audio collection
pub const AUDIO_COLLECTION: &str = "audio";
/// Name of the scores collection
pub const SCORES_COLLECTION: &str = "scores";

/// Parameters that distinguish one kind of binary asset from another.
///
/// Sprites and audio clips share every operation; only the collection, the
/// extension allow-list and the wording of responses differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetKind {
    /// Collection the documents live in
    pub collection: &'static str,
    /// Allowed filename suffixes (case-sensitive)
    pub allowed_extensions: &'static [&'static str],
    /// Label used in not-found errors
    pub entity: &'static str,
    /// Response message for a successful upload
    pub created_message: &'static str,
    /// Response message for a successful update
    pub updated_message: &'static str,
    /// Response message for a successful delete
    pub deleted_message: &'static str,
}

impl AssetKind {
    /// Sprite images
    pub const SPRITE: AssetKind = AssetKind {
        collection: SPRITES_COLLECTION,
        allowed_extensions: &[".png", ".jpg", ".jpeg"],
        entity: "Sprite",
        created_message: "Sprite uploaded",
        updated_message: "Sprite updated",
        deleted_message: "Sprite deleted",
    };

    /// Audio clips
    pub const AUDIO: AssetKind = AssetKind {
        collection: AUDIO_COLLECTION,
        allowed_extensions: &[".mp3", ".wav", ".ogg"],
        entity: "Audio file",
        created_message: "Audio file uploaded",
        updated_message: "Audio updated",
        deleted_message: "Audio deleted",
    };
}

/// Outbound view of a stored asset; content is hex-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetView {
    /// Store identifier
    pub id: RecordId,
    /// Original filename
    pub filename: String,
    /// Hex-encoded file content
    pub content: String,
}

/// Outbound view of a stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreView {
    /// Store identifier
    pub id: RecordId,
    /// Sanitized player name
    pub player_name: String,
    /// Non-negative score
    pub score: i64,
}

/// Inbound score submission, before validation.
///
/// Fields default so that missing values surface as validation errors rather
/// than as JSON decoding failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreSubmission {
    /// Raw player name
    #[serde(default)]
    pub player_name: String,
    /// Raw score; anything other than a JSON integer is rejected
    #[serde(default)]
    pub score: Value,
}

impl ScoreSubmission {
    /// Build a submission from already-typed values
    pub fn new(player_name: impl Into<String>, score: i64) -> Self {
        Self {
            player_name: player_name.into(),
            score: Value::from(score),
        }
    }
}
