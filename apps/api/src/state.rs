use std::sync::Arc;

use crate::evaluation::evaluator::Evaluator;
use crate::evaluation::extractor::TextExtractor;
use crate::leaderboard::SharedLeaderboard;

/// Shared application state injected into all route handlers via Axum extractors.
/// Created once in `main` and dropped when the server stops.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable evaluator. Default: LlmEvaluator over the chat-completions API.
    pub evaluator: Arc<dyn Evaluator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub leaderboard: SharedLeaderboard,
}
