//! HTTP integration tests driving the router in-process

use std::sync::Arc;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use mongodb::bson::Document;
use serde_json::{json, Value};
use tower::ServiceExt;
use asset_vault::api::create_app;
use asset_vault::core::{AppState, Config, RecordId, StoreError};
use asset_vault::storage::{DocumentStore, MemStore, StoreResult};
use asset_vault::system::metrics::{outcome, Metrics};

const BOUNDARY: &str = "asset-vault-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn app_with(config: Config) -> Router {
    create_app(Arc::new(AppState::new(Arc::new(MemStore::new()), config)))
}

fn app() -> Router {
    app_with(Config::default())
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(method: Method, uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body("file", filename, content)))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bare(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn sprite_lifecycle() {
    let app = app();

    let (status, body) = send(&app, upload(Method::POST, "/upload_sprite", "hero.png", PNG)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sprite uploaded");
    let id = id_of(&body);
    assert_eq!(id.len(), 24);

    let (status, body) = send(&app, bare(Method::GET, &format!("/sprite/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["filename"], "hero.png");
    assert!(body["content"].as_str().unwrap().starts_with("89504e47"));

    let (status, body) = send(&app, bare(Method::GET, "/sprites")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        upload(Method::PUT, &format!("/sprite/{id}"), "villain.jpg", b"\xff\xd8\xff\xe0"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Sprite updated" }));

    let (_, body) = send(&app, bare(Method::GET, &format!("/sprite/{id}"))).await;
    assert_eq!(body["filename"], "villain.jpg");
    assert_eq!(body["content"], "ffd8ffe0");

    let (status, body) = send(&app, bare(Method::DELETE, &format!("/sprite/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Sprite deleted" }));

    let (status, body) = send(&app, bare(Method::DELETE, &format!("/sprite/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Sprite not found");

    let (status, _) = send(&app, bare(Method::GET, &format!("/sprite/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_rejections() {
    let app = app();

    let (status, body) = send(&app, upload(Method::POST, "/upload_sprite", "hero.png", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Empty file");

    let (status, body) = send(&app, upload(Method::POST, "/upload_sprite", "hero.gif", PNG)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file type");
    assert_eq!(body["details"]["filename"], "hero.gif");

    let wrong_field = Request::builder()
        .method(Method::POST)
        .uri("/upload_sprite")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body("image", "hero.png", PNG)))
        .unwrap();
    let (status, body) = send(&app, wrong_field).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let (status, body) = send(&app, bare(Method::GET, "/sprites")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn audio_is_separate_from_sprites() {
    let app = app();

    let (status, body) = send(&app, upload(Method::POST, "/upload_audio", "theme.mp3", b"ID3\x03")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Audio file uploaded");
    let id = id_of(&body);

    let (status, _) = send(&app, upload(Method::POST, "/upload_audio", "hero.png", PNG)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, bare(Method::GET, &format!("/sprite/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Sprite not found");

    let (_, body) = send(&app, bare(Method::GET, "/audios")).await;
    assert_eq!(body[0]["content"], "49443303");

    let (status, body) = send(&app, upload(Method::PUT, &format!("/audio/{id}"), "theme.ogg", b"OggS")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Audio updated");

    let missing = RecordId::generate();
    let (status, body) = send(&app, bare(Method::GET, &format!("/audio/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Audio file not found");

    let (status, body) = send(&app, bare(Method::DELETE, &format!("/audio/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Audio deleted");
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = app();
    for uri in ["/sprite/nope", "/audio/123", "/player_score/zzzzzzzzzzzzzzzzzzzzzzzz"] {
        let (status, body) = send(&app, bare(Method::GET, uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid identifier"));
    }
}

#[tokio::test]
async fn score_lifecycle() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/upload_player_score", json!({ "player_name": "Bob!!", "score": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Score recorded");
    let id = id_of(&body);

    let (status, body) = send(&app, bare(Method::GET, &format!("/player_score/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "player_name": "Bob", "score": 10 }));

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &format!("/player_score/{id}"), json!({ "player_name": "Bob", "score": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Score updated");

    let (_, body) = send(&app, bare(Method::GET, "/player_scores")).await;
    assert_eq!(body, json!([{ "id": id, "player_name": "Bob", "score": 25 }]));

    let (status, body) = send(&app, bare(Method::DELETE, &format!("/player_score/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Score deleted");

    let (status, body) = send(&app, bare(Method::GET, &format!("/player_score/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Score not found");
}

#[tokio::test]
async fn score_alias_route_records() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/player_score", json!({ "player_name": "Ann", "score": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Score recorded");
}

#[tokio::test]
async fn score_rejections_write_nothing() {
    let app = app();
    let cases = [
        (json!({ "player_name": "Ann", "score": -5 }), "Score must be non-negative"),
        (json!({ "player_name": "Ann", "score": 1.5 }), "Score must be an integer"),
        (json!({ "player_name": "Ann", "score": "10" }), "Score must be an integer"),
        (json!({ "score": 10 }), "Player name is required"),
        (json!({ "player_name": "Ann" }), "Score must be an integer"),
    ];

    for (payload, message) in cases {
        let (status, body) = send(&app, json_request(Method::POST, "/upload_player_score", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/upload_player_score")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Malformed JSON");

    let (_, body) = send(&app, bare(Method::GET, "/player_scores")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn listing_is_clamped_to_configured_cap() {
    let mut config = Config::default();
    config.storage.list_limit = 2;
    let app = app_with(config);

    for score in 0..4 {
        let (status, _) = send(
            &app,
            json_request(Method::POST, "/upload_player_score", json!({ "player_name": "Ann", "score": score })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, bare(Method::GET, "/player_scores")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (_, body) = send(&app, bare(Method::GET, "/player_scores?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, bare(Method::GET, "/player_scores?limit=500")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (status, body) = send(&app, bare(Method::GET, "/player_scores?limit=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.server.max_upload_bytes = 256;
    let app = app_with(config);

    let big = vec![0xAB_u8; 4096];
    let (status, _) = send(&app, upload(Method::POST, "/upload_sprite", "big.png", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, body) = send(&app, bare(Method::GET, "/sprites")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn system_routes() {
    let app = app();

    let (status, body) = send(&app, bare(Method::GET, "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");

    let (status, body) = send(&app, bare(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let (status, body) = send(&app, bare(Method::GET, "/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"], json!(["sprites", "audio", "scores"]));
    assert_eq!(body["list_limit"], 100);

    send(&app, upload(Method::POST, "/upload_sprite", "hero.png", PNG)).await;
    let (status, body) = send(&app, bare(Method::GET, "/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("av_store_operations_total"));
    assert!(text.contains("collection=\"sprites\""));
}

#[tokio::test]
async fn metrics_route_absent_when_disabled() {
    let mut config = Config::default();
    config.metrics.enable_prometheus = false;
    let app = app_with(config);

    let (status, _) = send(&app, bare(Method::GET, "/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // operations are still counted, only the route is gone
    let metrics = Metrics::global();
    let before = metrics.count("sprites", "create", outcome::OK);
    let (status, _) = send(&app, upload(Method::POST, "/upload_sprite", "hero.png", PNG)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics.count("sprites", "create", outcome::OK) > before);
}

/// Store whose every operation fails, standing in for an unreachable server
struct UnavailableStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Unexpected("connection refused".to_string()))
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn insert_one(&self, _collection: &str, _fields: Document) -> StoreResult<RecordId> {
        unavailable()
    }

    async fn find_one(&self, _collection: &str, _id: RecordId) -> StoreResult<Option<Document>> {
        unavailable()
    }

    async fn find_many(&self, _collection: &str, _limit: usize) -> StoreResult<Vec<Document>> {
        unavailable()
    }

    async fn replace_one(&self, _collection: &str, _id: RecordId, _fields: Document) -> StoreResult<bool> {
        unavailable()
    }

    async fn delete_one(&self, _collection: &str, _id: RecordId) -> StoreResult<bool> {
        unavailable()
    }

    async fn ping(&self) -> StoreResult<()> {
        unavailable()
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::test]
async fn store_failures_are_server_errors() {
    let app = create_app(Arc::new(AppState::new(Arc::new(UnavailableStore), Config::default())));

    let (status, body) = send(&app, bare(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");

    let (status, body) = send(&app, bare(Method::GET, "/sprites")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    // a zero limit is answered without a store round-trip
    let (status, body) = send(&app, bare(Method::GET, "/sprites?limit=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/upload_player_score", json!({ "player_name": "Ann", "score": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // validation still runs before the store is touched
    let (status, _) = send(&app, upload(Method::POST, "/upload_sprite", "hero.png", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
