//! HTTP server implementation for the Asset Vault API

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use crate::core::app_state::AppState;
use crate::core::error::Result;
use crate::core::factory::ConfiguredAppState;
use crate::storage::StorageImpl;
use super::handlers;

/// Creates the main application router with all routes and middleware
pub fn create_app<S: StorageImpl>(app_state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_origin(Any);

    let mut router = Router::new()
        // Root route
        .route("/", get(handlers::root_handler))

        // Sprite routes
        .route("/upload_sprite", post(handlers::upload_sprite::<S>))
        .route("/sprites", get(handlers::list_sprites::<S>))
        .route(
            "/sprite/{id}",
            get(handlers::get_sprite::<S>)
                .put(handlers::update_sprite::<S>)
                .delete(handlers::delete_sprite::<S>),
        )

        // Audio routes
        .route("/upload_audio", post(handlers::upload_audio::<S>))
        .route("/audios", get(handlers::list_audio::<S>))
        .route(
            "/audio/{id}",
            get(handlers::get_audio::<S>)
                .put(handlers::update_audio::<S>)
                .delete(handlers::delete_audio::<S>),
        )

        // Score routes
        .route("/upload_player_score", post(handlers::create_score::<S>))
        .route("/player_score", post(handlers::create_score::<S>))
        .route("/player_scores", get(handlers::list_scores::<S>))
        .route(
            "/player_score/{id}",
            get(handlers::get_score::<S>)
                .put(handlers::update_score::<S>)
                .delete(handlers::delete_score::<S>),
        )

        // System routes
        .route("/health", get(handlers::health_check::<S>))
        .route("/info", get(handlers::system_info::<S>));

    if app_state.config.metrics.enable_prometheus {
        router = router.route("/metrics", get(handlers::metrics_handler));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(app_state.config.server.max_upload_bytes)),
        )
        .with_state(app_state)
}

async fn serve_with_app<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Start the HTTP server with the configured AppState, stopping when
/// `shutdown` resolves
pub async fn start_api_server<F>(configured_app_state: ConfiguredAppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let http_addr = configured_app_state.http_addr();

    info!(
        backend = configured_app_state.backend_name(),
        "Starting Asset Vault API server on {}", http_addr
    );

    // Match once on storage type to get concrete AppState, then start server
    match configured_app_state {
        ConfiguredAppState::Memory(app_state) => {
            serve_with_app(http_addr, create_app(app_state), shutdown).await
        }
        ConfiguredAppState::Mongo(app_state) => {
            serve_with_app(http_addr, create_app(app_state), shutdown).await
        }
    }
}
