//! Evaluator — scores one résumé against one job description.
//!
//! Never fails: every error on the AI path becomes `Evaluation::Fallback`, so
//! one bad response cannot abort the rest of a batch.
//!
//! `AppState` holds an `Arc<dyn Evaluator>`; `LlmEvaluator` is the production backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::evaluation::models::{Evaluation, EvaluationResult, RawEvaluation};
use crate::evaluation::prompts::{build_evaluation_payload, EVALUATION_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, job_description: &str, resume_text: &str) -> Evaluation;
}

/// Evaluator backed by the chat-completions API.
///
/// Calls share a semaphore across all requests so a burst of uploads cannot
/// exceed the provider's rate limit, and each call is bounded by `timeout`.
pub struct LlmEvaluator {
    llm: LlmClient,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl LlmEvaluator {
    pub fn new(llm: LlmClient, max_concurrent_calls: usize, timeout: Duration) -> Self {
        Self {
            llm,
            permits: Arc::new(Semaphore::new(max_concurrent_calls)),
            timeout,
        }
    }

    async fn call_model(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<EvaluationResult, String> {
        let payload = build_evaluation_payload(job_description, resume_text);

        // the wait for a permit counts against the timeout
        let call = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| format!("evaluation pool closed: {e}"))?;
            self.llm
                .call_json::<RawEvaluation>(&payload, EVALUATION_SYSTEM)
                .await
                .map_err(|e| e.to_string())
        };
        let raw = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(self.timeout).to_string())??;

        EvaluationResult::try_from(raw)
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(&self, job_description: &str, resume_text: &str) -> Evaluation {
        match self.call_model(job_description, resume_text).await {
            Ok(result) => {
                debug!(score = result.score, "Resume scored");
                Evaluation::Scored(result)
            }
            Err(reason) => {
                warn!("AI evaluation failed, using fallback: {reason}");
                Evaluation::fallback(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    const SCORED_CONTENT: &str =
        r#"{"score": 70, "suggestion": "s", "justification": "j", "edits": []}"#;

    /// Serves a fixed chat-completions reply on an ephemeral port and returns its base URL.
    async fn fake_provider(status: StatusCode, body: Value) -> String {
        serve(Router::new().route(
            "/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        ))
        .await
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn completion(content: &str) -> Value {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40}
        })
    }

    fn evaluator(base_url: String, api_key: Option<&str>) -> LlmEvaluator {
        let llm = LlmClient::new(
            api_key.map(String::from),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap();
        LlmEvaluator::new(llm, 2, Duration::from_secs(5))
    }

    fn bounded_evaluator(base_url: String, permits: usize, timeout: Duration) -> LlmEvaluator {
        let llm = LlmClient::new(Some("gsk_test".to_string()), base_url, Duration::from_secs(30))
            .unwrap();
        LlmEvaluator::new(llm, permits, timeout)
    }

    #[tokio::test]
    async fn test_successful_call_is_scored() {
        let content = r#"{"score": 85, "suggestion": "Good fit", "justification": "Strong match", "edits": ["Add metrics"]}"#;
        let url = fake_provider(StatusCode::OK, completion(content)).await;

        let evaluation = evaluator(url, Some("gsk_test"))
            .evaluate("Python required", "Senior Python developer with ten years of experience")
            .await;

        assert_eq!(
            evaluation,
            Evaluation::Scored(EvaluationResult {
                score: 85,
                suggestion: "Good fit".to_string(),
                justification: "Strong match".to_string(),
                edits: vec!["Add metrics".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let content = "```json\n{\"score\": 55, \"suggestion\": \"s\", \"justification\": \"j\"}\n```";
        let url = fake_provider(StatusCode::OK, completion(content)).await;

        let evaluation = evaluator(url, Some("gsk_test")).evaluate("jd", "resume").await;

        assert!(!evaluation.is_fallback());
        assert_eq!(evaluation.result().score, 55);
        assert!(evaluation.result().edits.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let url = fake_provider(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"message": "upstream exploded"}}),
        )
        .await;

        let evaluation = evaluator(url, Some("gsk_test")).evaluate("jd", "resume").await;

        match evaluation {
            Evaluation::Fallback { result, reason } => {
                assert_eq!(result, EvaluationResult::fallback());
                assert!(reason.contains("upstream exploded"), "reason was {reason}");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_score_falls_back() {
        let content = r#"{"score": 150, "suggestion": "s", "justification": "j", "edits": []}"#;
        let url = fake_provider(StatusCode::OK, completion(content)).await;

        let evaluation = evaluator(url, Some("gsk_test")).evaluate("jd", "resume").await;

        assert!(evaluation.is_fallback());
        assert_eq!(evaluation.result().score, 0);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back() {
        let url = fake_provider(StatusCode::OK, completion("I think this candidate is great")).await;

        let evaluation = evaluator(url, Some("gsk_test")).evaluate("jd", "resume").await;

        assert!(evaluation.is_fallback());
    }

    #[tokio::test]
    async fn test_missing_api_key_falls_back() {
        let evaluation = evaluator("http://127.0.0.1:9".to_string(), None)
            .evaluate("jd", "resume")
            .await;

        match evaluation {
            Evaluation::Fallback { reason, .. } => assert!(reason.contains("API key")),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back() {
        // Port 9 (discard) is closed on test machines; connect is refused.
        let evaluation = evaluator("http://127.0.0.1:9".to_string(), Some("gsk_test"))
            .evaluate("jd", "resume")
            .await;

        assert!(evaluation.is_fallback());
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let url = serve(Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(completion(SCORED_CONTENT))
            }),
        ))
        .await;

        let evaluation = bounded_evaluator(url, 1, Duration::from_millis(300))
            .evaluate("jd", "resume")
            .await;

        match evaluation {
            Evaluation::Fallback { result, reason } => {
                assert_eq!(result, EvaluationResult::fallback());
                assert!(reason.contains("LLM call timed out"), "reason was {reason}");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_waiting_for_a_permit_counts_against_timeout() {
        let url = fake_provider(StatusCode::OK, completion(SCORED_CONTENT)).await;
        let evaluator = bounded_evaluator(url, 1, Duration::from_millis(200));
        let _held = evaluator.permits.clone().acquire_owned().await.unwrap();

        let evaluation = tokio::time::timeout(
            Duration::from_secs(5),
            evaluator.evaluate("jd", "resume"),
        )
        .await
        .expect("evaluate must give up on its own");

        match evaluation {
            Evaluation::Fallback { reason, .. } => {
                assert!(reason.contains("timed out"), "reason was {reason}")
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_permit_serializes_calls() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (current, peak) = (in_flight.clone(), max_seen.clone());
        let url = serve(Router::new().route(
            "/chat/completions",
            post(move || {
                let (current, peak) = (current.clone(), peak.clone());
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Json(completion(SCORED_CONTENT))
                }
            }),
        ))
        .await;
        let evaluator = bounded_evaluator(url, 1, Duration::from_secs(10));

        let (first, second) = tokio::join!(
            evaluator.evaluate("jd", "first resume"),
            evaluator.evaluate("jd", "second resume"),
        );

        assert!(!first.is_fallback(), "first was {first:?}");
        assert!(!second.is_fallback(), "second was {second:?}");
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
