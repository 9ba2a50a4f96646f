//! In-memory leaderboard of evaluated résumés, ranked by match score.
//!
//! Lives for the lifetime of the process; there is no persistence and no
//! per-entry removal. Shared between requests as `SharedLeaderboard`.

pub mod handlers;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::evaluation::models::{Evaluation, EvaluationResult};

pub type SharedLeaderboard = Arc<RwLock<Leaderboard>>;

/// Length of the short entry id (hex characters of a v4 UUID).
const SHORT_ID_LEN: usize = 8;

/// One evaluated résumé. `rank` is 0 until the board is first sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub filename: String,
    pub rank: u32,
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
    /// True when the AI call failed and the fixed fallback result was used.
    pub fallback: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(filename: impl Into<String>, evaluation: Evaluation) -> Self {
        let fallback = evaluation.is_fallback();
        Self {
            id: short_id(),
            filename: filename.into(),
            rank: 0,
            evaluation: evaluation.into_result(),
            fallback,
            evaluated_at: Utc::now(),
        }
    }

    pub fn score(&self) -> u8 {
        self.evaluation.score
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedLeaderboard {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Adds an entry at the end. Ordering is only restored by `sort_and_rank`.
    pub fn append(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
    }

    /// Stable sort by score descending, then rank = 1-based position.
    /// Equal scores keep insertion order.
    pub fn sort_and_rank(&mut self) {
        self.entries.sort_by(|a, b| b.score().cmp(&a.score()));
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = position as u32 + 1;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        self.entries.clone()
    }

    pub fn rank_of(&self, id: &str) -> Option<u32> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.rank)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
