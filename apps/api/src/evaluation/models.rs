//! Evaluation data model shared by the evaluator, the pipeline and the leaderboard.

use serde::{Deserialize, Serialize};

pub const FALLBACK_SUGGESTION: &str = "AI Service Unavailable";
pub const FALLBACK_JUSTIFICATION: &str = "Could not process resume.";
pub const MAX_SCORE: u8 = 100;

/// Structured verdict for one résumé against one job description.
/// `score` is always within 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: u8,
    pub suggestion: String,
    pub justification: String,
    #[serde(default)]
    pub edits: Vec<String>,
}

impl EvaluationResult {
    /// The fixed result substituted when the AI call fails.
    pub fn fallback() -> Self {
        Self {
            score: 0,
            suggestion: FALLBACK_SUGGESTION.to_string(),
            justification: FALLBACK_JUSTIFICATION.to_string(),
            edits: Vec::new(),
        }
    }
}

/// Outcome of one evaluation call. Callers that only need the numbers use
/// `into_result`; callers that care whether the AI actually answered match on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(EvaluationResult),
    Fallback {
        result: EvaluationResult,
        reason: String,
    },
}

impl Evaluation {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Evaluation::Fallback {
            result: EvaluationResult::fallback(),
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Evaluation::Fallback { .. })
    }

    pub fn result(&self) -> &EvaluationResult {
        match self {
            Evaluation::Scored(result) | Evaluation::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> EvaluationResult {
        match self {
            Evaluation::Scored(result) | Evaluation::Fallback { result, .. } => result,
        }
    }
}

/// Shape the model is asked to return. Looser than `EvaluationResult` so that
/// out-of-range or fractional scores are rejected with a readable reason
/// instead of an opaque serde error.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEvaluation {
    pub score: RawScore,
    pub suggestion: String,
    pub justification: String,
    #[serde(default)]
    pub edits: Vec<String>,
}

/// Models sometimes quote the score (`"85"`); both forms are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawScore {
    Number(f64),
    Text(String),
}

impl RawScore {
    fn to_number(&self) -> Result<f64, String> {
        match self {
            RawScore::Number(n) => Ok(*n),
            RawScore::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("score {s:?} is not a number")),
        }
    }
}

impl TryFrom<RawEvaluation> for EvaluationResult {
    type Error = String;

    fn try_from(raw: RawEvaluation) -> Result<Self, Self::Error> {
        let score = raw.score.to_number()?;
        if score.fract() != 0.0 || !(0.0..=f64::from(MAX_SCORE)).contains(&score) {
            return Err(format!("score {score} is not an integer in 0..=100"));
        }
        Ok(EvaluationResult {
            score: score as u8,
            suggestion: raw.suggestion,
            justification: raw.justification,
            edits: raw.edits,
        })
    }
}

/// JSON body for `POST /evaluate-json`.
#[derive(Debug, Deserialize)]
pub struct EvaluateJsonRequest {
    pub job_description: String,
    pub user_resume: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateJsonResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub fallback: bool,
}
