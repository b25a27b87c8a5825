//! # API Module
//!
//! HTTP interface for Asset Vault.
//!
//! ## Endpoints Overview
//!
//! ### Sprites
//! - `POST /upload_sprite` - Upload a sprite (multipart field `file`)
//! - `GET /sprites` - List sprites (`?limit=N`)
//! - `GET /sprite/{id}` - Get sprite by ID
//! - `PUT /sprite/{id}` - Replace sprite
//! - `DELETE /sprite/{id}` - Delete sprite
//!
//! ### Audio
//! - `POST /upload_audio`, `GET /audios`, `GET/PUT/DELETE /audio/{id}`
//!
//! ### Player scores
//! - `POST /upload_player_score` (also `POST /player_score`) - JSON `{player_name, score}`
//! - `GET /player_scores`, `GET/PUT/DELETE /player_score/{id}`
//!
//! ### System Essentials
//! - `GET /health` - Store ping
//! - `GET /info` - Service info
//! - `GET /metrics` - Prometheus metrics

pub mod handlers;
pub mod server;

pub use server::{create_app, start_api_server};
