//! Batch evaluation: validate → extract → length check → evaluate → append,
//! one uploaded file at a time.
//!
//! Files are processed strictly in order so a large batch never bursts the
//! provider's rate limit. A file that cannot be used is skipped and logged;
//! it never fails the batch.

use std::panic::AssertUnwindSafe;

use bytes::Bytes;
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::leaderboard::LeaderboardEntry;
use crate::state::AppState;

/// Extracted text shorter than this is treated as unreadable.
pub const MIN_TEXT_CHARS: usize = 50;
pub const NO_VALID_DOCUMENTS: &str = "No valid PDFs were processed.";
const ACCEPTED_EXTENSION: &str = ".pdf";

/// One uploaded file as received from the form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Why a file produced no entry.
#[derive(Debug, Error, PartialEq)]
pub enum SkipReason {
    #[error("not a PDF")]
    UnsupportedType,

    #[error("empty upload")]
    EmptyUpload,

    #[error("no extractable text")]
    NoText,

    #[error("only {chars} characters of text (minimum {min})", min = MIN_TEXT_CHARS)]
    TooShort { chars: usize },

    #[error("extraction task failed: {0}")]
    ExtractionFailed(String),

    #[error("evaluator panicked")]
    EvaluatorPanicked,
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// Entries created by this batch, carrying their post-sort ranks.
    pub results: Vec<LeaderboardEntry>,
    /// Full leaderboard after the batch.
    pub rankings: Vec<LeaderboardEntry>,
}

impl BatchOutcome {
    pub fn error(&self) -> Option<&'static str> {
        self.results.is_empty().then_some(NO_VALID_DOCUMENTS)
    }
}

pub fn is_accepted_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(ACCEPTED_EXTENSION)
}

/// Runs every upload through the pipeline and folds the results into the leaderboard.
pub async fn evaluate_batch(
    state: &AppState,
    job_description: &str,
    uploads: Vec<Upload>,
) -> BatchOutcome {
    let total = uploads.len();
    let mut results = Vec::new();

    for upload in uploads {
        let filename = upload.filename.clone();
        match evaluate_upload(state, job_description, upload).await {
            Ok(entry) => {
                state.leaderboard.write().await.append(entry.clone());
                results.push(entry);
            }
            Err(SkipReason::UnsupportedType) => {
                debug!(%filename, "Skipping upload: not a PDF");
            }
            Err(reason @ (SkipReason::ExtractionFailed(_) | SkipReason::EvaluatorPanicked)) => {
                warn!(%filename, "Skipping upload: {reason}");
            }
            Err(reason) => {
                info!(%filename, "Skipping upload: {reason}");
            }
        }
    }

    if results.is_empty() {
        warn!(total, "{NO_VALID_DOCUMENTS}");
        return BatchOutcome {
            results,
            rankings: state.leaderboard.read().await.snapshot(),
        };
    }

    let mut board = state.leaderboard.write().await;
    board.sort_and_rank();
    for entry in &mut results {
        if let Some(rank) = board.rank_of(&entry.id) {
            entry.rank = rank;
        }
    }

    info!(
        processed = results.len(),
        total,
        leaderboard_size = board.len(),
        "Batch evaluated"
    );

    BatchOutcome {
        results,
        rankings: board.snapshot(),
    }
}

async fn evaluate_upload(
    state: &AppState,
    job_description: &str,
    upload: Upload,
) -> Result<LeaderboardEntry, SkipReason> {
    if !is_accepted_filename(&upload.filename) {
        return Err(SkipReason::UnsupportedType);
    }
    if upload.data.is_empty() {
        return Err(SkipReason::EmptyUpload);
    }

    // PDF parsing is CPU bound; keep it off the async workers
    let extractor = state.extractor.clone();
    let data = upload.data;
    let text = tokio::task::spawn_blocking(move || extractor.extract(&data))
        .await
        .map_err(|e| SkipReason::ExtractionFailed(e.to_string()))?;

    if text.is_empty() {
        return Err(SkipReason::NoText);
    }
    let chars = text.chars().count();
    if chars < MIN_TEXT_CHARS {
        return Err(SkipReason::TooShort { chars });
    }

    let evaluation = AssertUnwindSafe(state.evaluator.evaluate(job_description, &text))
        .catch_unwind()
        .await
        .map_err(|_| SkipReason::EvaluatorPanicked)?;
    debug!(
        filename = %upload.filename,
        score = evaluation.result().score,
        fallback = evaluation.is_fallback(),
        "Resume evaluated"
    );
    Ok(LeaderboardEntry::new(upload.filename, evaluation))
}
