//! Axum route handlers for résumé evaluation.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::models::{EvaluateJsonRequest, EvaluateJsonResponse};
use crate::evaluation::pipeline::{evaluate_batch, Upload};
use crate::leaderboard::LeaderboardEntry;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub results: Vec<LeaderboardEntry>,
    pub rankings: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

/// Parsed `POST /evaluate` form.
struct EvaluationForm {
    job_description: String,
    uploads: Vec<Upload>,
}

/// POST /evaluate
///
/// Multipart form with `job_description` and one or more `files`.
/// A batch where no file could be used is answered with 200 and an `error`
/// message alongside the unchanged rankings.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluateResponse>, AppError> {
    let form = read_evaluation_form(multipart).await?;
    info!(files = form.uploads.len(), "Evaluating upload batch");

    let outcome = evaluate_batch(&state, &form.job_description, form.uploads).await;

    Ok(Json(EvaluateResponse {
        error: outcome.error().map(String::from),
        results: outcome.results,
        rankings: outcome.rankings,
    }))
}

/// POST /evaluate-json
///
/// Scores raw résumé text without touching the leaderboard.
pub async fn handle_evaluate_json(
    State(state): State<AppState>,
    Json(request): Json<EvaluateJsonRequest>,
) -> Result<Json<EvaluateJsonResponse>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if request.user_resume.trim().is_empty() {
        return Err(AppError::Validation("user_resume cannot be empty".to_string()));
    }

    let evaluation = state
        .evaluator
        .evaluate(&request.job_description, &request.user_resume)
        .await;

    Ok(Json(EvaluateJsonResponse {
        fallback: evaluation.is_fallback(),
        result: evaluation.into_result(),
    }))
}

async fn read_evaluation_form(mut multipart: Multipart) -> Result<EvaluationForm, AppError> {
    let mut job_description: Option<String> = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = Some(field.text().await?);
            }
            Some(FILES_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                uploads.push(Upload::new(filename, data));
            }
            _ => {}
        }
    }

    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| {
            AppError::UnprocessableEntity(format!("'{JOB_DESCRIPTION_FIELD}' field is required"))
        })?;

    if uploads.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "at least one '{FILES_FIELD}' upload is required"
        )));
    }

    Ok(EvaluationForm {
        job_description,
        uploads,
    })
}
