pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::recommendation::handlers as recommendation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/recommend", post(recommendation::handle_recommend))
        .route("/api/v1/clusters", get(recommendation::handle_clusters))
        .route(
            "/api/v1/occupations/:code/competencies",
            get(recommendation::handle_competencies),
        )
        .route("/api/v1/chat", post(chat::handle_chat))
        .with_state(state)
}
