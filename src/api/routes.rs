use std::path::Path;

use axum::{Router, routing::post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers::chat;

/// Build the HTTP surface: `POST /chat` plus static files from `static_dir`
/// on every other path.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
