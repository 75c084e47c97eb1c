pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::dialogue::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat API
        .route("/api/v1/chat/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/chat/analyze-image",
            post(handlers::handle_analyze_image)
                .layer(DefaultBodyLimit::max(handlers::MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/chat/clear", post(handlers::handle_clear))
        .route("/api/v1/chat/history", get(handlers::handle_history))
        // Job listings
        .route("/api/v1/jobs", get(handlers::handle_get_jobs))
        .with_state(state)
}
