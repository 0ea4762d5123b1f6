pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analyze))
        .route("/api/v1/analysis/resume", post(handlers::handle_analyze_resume))
        .route(
            "/api/v1/analysis/resume/upload",
            post(handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/analysis/resume/chat",
            post(handlers::handle_analyze_resume_for_chat),
        )
        .route(
            "/api/v1/analysis/resume/summary",
            post(handlers::handle_summarize_resume),
        )
        // Learning API
        .route(
            "/api/v1/learning/content",
            post(handlers::handle_learning_content),
        )
        .with_state(state)
}
