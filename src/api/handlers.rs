//! HTTP request handlers for the Asset Vault API
//!
//! Handlers are thin: extract, call the repository, shape the response. All
//! failures flow through `impl IntoResponse for Error`.

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    Json as JsonExtractor,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};
use crate::core::app_state::AppState;
use crate::core::error::{Error, ValidationError};
use crate::core::ids::RecordId;
use crate::core::types::{AssetView, ScoreSubmission, ScoreView};
use crate::repository::AssetRepository;
use crate::storage::StorageImpl;
use crate::system::metrics::collect_metrics;

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Shared state type seen by every handler
pub type SharedState<S> = State<Arc<AppState<S>>>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Whether the operation was successful (always false)
    pub success: bool,
    /// Error message
    pub error: String,
    /// Optional details about what was invalid
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Error response with a message only
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    /// Error response with details
    pub fn with_details(error: impl Into<String>, details: Value) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if status.is_server_error() {
            error!(error = %self, "Request failed");
            ErrorResponse::new("Internal server error")
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
            match &self {
                Error::Validation(ValidationError::UnsupportedExtension { filename }) => {
                    ErrorResponse::with_details(self.to_string(), json!({ "filename": filename }))
                }
                _ => ErrorResponse::new(self.to_string()),
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Response carrying a message only
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// What happened
    pub message: &'static str,
}

/// Response to a successful create
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// What happened
    pub message: &'static str,
    /// Identifier of the new document
    pub id: RecordId,
}

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,
    /// Process uptime
    pub uptime: String,
    /// Service version
    pub version: &'static str,
    /// Storage backend in use
    pub storage: &'static str,
}

/// System information and capabilities
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Service name
    pub name: &'static str,
    /// Service version
    pub version: &'static str,
    /// Storage backend in use
    pub storage: &'static str,
    /// Collections served
    pub collections: Vec<&'static str>,
    /// Maximum items returned by a listing
    pub list_limit: usize,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Requested number of items, clamped to the configured cap
    pub limit: Option<usize>,
}

/// Custom JSON extractor that returns proper JSON error responses
pub struct JsonRequest<T>(pub T);

impl<T, S> FromRequest<S> for JsonRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match JsonExtractor::<T>::from_request(req, state).await {
            Ok(JsonExtractor(value)) => Ok(JsonRequest(value)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        warn!("Invalid JSON data: {}", err);
                        "Invalid JSON data"
                    }
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing or invalid Content-Type header. Expected 'application/json'"
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body",
                    _ => "Invalid JSON request",
                };

                warn!("JSON parsing error: {}", error_message);
                Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error_message))))
            }
        }
    }
}

/// The `file` part of a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied filename (empty when absent)
    pub filename: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

impl<S> FromRequest<S> for UploadedFile
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            warn!("Multipart rejected: {}", rejection.body_text());
            (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
        })?;

        loop {
            let field = multipart.next_field().await.map_err(|e| {
                warn!("Multipart read failed: {}", e.body_text());
                (e.status(), Json(ErrorResponse::new(e.body_text())))
            })?;
            let Some(field) = field else { break };
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field.bytes().await.map_err(|e| {
                warn!(filename = %filename, "Upload read failed: {}", e.body_text());
                (e.status(), Json(ErrorResponse::new(e.body_text())))
            })?;
            return Ok(UploadedFile {
                filename,
                content: content.to_vec(),
            });
        }

        Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new("No file uploaded"))))
    }
}

// Asset helpers shared by sprites and audio

async fn create_asset<S: StorageImpl>(
    repo: &AssetRepository<S>,
    file: UploadedFile,
) -> Result<Json<CreatedResponse>, Error> {
    let id = repo.create(&file.filename, file.content).await?;
    Ok(Json(CreatedResponse {
        message: repo.kind().created_message,
        id,
    }))
}

async fn update_asset<S: StorageImpl>(
    repo: &AssetRepository<S>,
    id: &str,
    file: UploadedFile,
) -> Result<Json<MessageResponse>, Error> {
    repo.update(id, &file.filename, file.content).await?;
    Ok(Json(MessageResponse {
        message: repo.kind().updated_message,
    }))
}

async fn delete_asset<S: StorageImpl>(
    repo: &AssetRepository<S>,
    id: &str,
) -> Result<Json<MessageResponse>, Error> {
    repo.delete(id).await?;
    Ok(Json(MessageResponse {
        message: repo.kind().deleted_message,
    }))
}

// Sprite handlers

/// Upload a sprite image
pub async fn upload_sprite<S: StorageImpl>(
    State(state): SharedState<S>,
    file: UploadedFile,
) -> Result<Json<CreatedResponse>, Error> {
    create_asset(&state.sprites, file).await
}

/// List sprites
pub async fn list_sprites<S: StorageImpl>(
    State(state): SharedState<S>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AssetView>>, Error> {
    Ok(Json(state.sprites.list_all(query.limit).await?))
}

/// Get one sprite
pub async fn get_sprite<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<AssetView>, Error> {
    Ok(Json(state.sprites.get(&id).await?))
}

/// Replace a sprite
pub async fn update_sprite<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    file: UploadedFile,
) -> Result<Json<MessageResponse>, Error> {
    update_asset(&state.sprites, &id, file).await
}

/// Delete a sprite
pub async fn delete_sprite<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    delete_asset(&state.sprites, &id).await
}

// Audio handlers

/// Upload an audio clip
pub async fn upload_audio<S: StorageImpl>(
    State(state): SharedState<S>,
    file: UploadedFile,
) -> Result<Json<CreatedResponse>, Error> {
    create_asset(&state.audio, file).await
}

/// List audio clips
pub async fn list_audio<S: StorageImpl>(
    State(state): SharedState<S>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AssetView>>, Error> {
    Ok(Json(state.audio.list_all(query.limit).await?))
}

/// Get one audio clip
pub async fn get_audio<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<AssetView>, Error> {
    Ok(Json(state.audio.get(&id).await?))
}

/// Replace an audio clip
pub async fn update_audio<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    file: UploadedFile,
) -> Result<Json<MessageResponse>, Error> {
    update_asset(&state.audio, &id, file).await
}

/// Delete an audio clip
pub async fn delete_audio<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    delete_asset(&state.audio, &id).await
}

// Score handlers

/// Record a player score
pub async fn create_score<S: StorageImpl>(
    State(state): SharedState<S>,
    JsonRequest(submission): JsonRequest<ScoreSubmission>,
) -> Result<Json<CreatedResponse>, Error> {
    let id = state.scores.create(&submission).await?;
    Ok(Json(CreatedResponse {
        message: "Score recorded",
        id,
    }))
}

/// List scores
pub async fn list_scores<S: StorageImpl>(
    State(state): SharedState<S>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ScoreView>>, Error> {
    Ok(Json(state.scores.list_all(query.limit).await?))
}

/// Get one score
pub async fn get_score<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<ScoreView>, Error> {
    Ok(Json(state.scores.get(&id).await?))
}

/// Replace a score
pub async fn update_score<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    JsonRequest(submission): JsonRequest<ScoreSubmission>,
) -> Result<Json<MessageResponse>, Error> {
    state.scores.update(&id, &submission).await?;
    Ok(Json(MessageResponse {
        message: "Score updated",
    }))
}

/// Delete a score
pub async fn delete_score<S: StorageImpl>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    state.scores.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Score deleted",
    }))
}

// System handlers

/// Health check endpoint; pings the store
pub async fn health_check<S: StorageImpl>(
    State(state): SharedState<S>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, code) = match state.store.ping().await {
        Ok(()) => ("healthy", StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let response = HealthResponse {
        status,
        uptime: format!("{}s", state.uptime().as_secs()),
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend_name(),
    };
    (code, Json(response))
}

/// System information endpoint
pub async fn system_info<S: StorageImpl>(State(state): SharedState<S>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend_name(),
        collections: vec![
            state.sprites.kind().collection,
            state.audio.kind().collection,
            crate::core::types::SCORES_COLLECTION,
        ],
        list_limit: state.config.storage.list_limit,
        max_upload_bytes: state.config.server.max_upload_bytes,
    })
}

/// Root API endpoint
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "Asset Vault API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "sprites": "/sprites",
            "audio": "/audios",
            "scores": "/player_scores",
            "health": "/health",
            "info": "/info"
        }
    }))
}

/// Prometheus text exposition
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        collect_metrics(),
    )
}
