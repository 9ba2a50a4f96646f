// Résumé evaluation: PDF text extraction, AI scoring and the per-upload pipeline.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod evaluator;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
