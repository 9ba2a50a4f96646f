use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::leaderboard::LeaderboardEntry;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub rankings: Vec<LeaderboardEntry>,
}

/// GET /
///
/// Current leaderboard, re-sorted and re-ranked on every read.
pub async fn handle_index(State(state): State<AppState>) -> Json<RankingsResponse> {
    let mut board = state.leaderboard.write().await;
    board.sort_and_rank();
    Json(RankingsResponse {
        rankings: board.snapshot(),
    })
}

/// POST /clear
pub async fn handle_clear(State(state): State<AppState>) -> Json<RankingsResponse> {
    let mut board = state.leaderboard.write().await;
    let removed = board.len();
    board.clear();
    info!(removed, "Leaderboard cleared");
    Json(RankingsResponse {
        rankings: board.snapshot(),
    })
}
