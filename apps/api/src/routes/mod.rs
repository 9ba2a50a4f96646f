pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::leaderboard::handlers as leaderboard;
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(leaderboard::handle_index))
        .route("/clear", post(leaderboard::handle_clear))
        .route("/evaluate", post(evaluation::handle_evaluate))
        .route("/evaluate-json", post(evaluation::handle_evaluate_json))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
