// Prompt constants for résumé evaluation.

/// System prompt for the ATS comparison. The model receives the job description
/// and résumé as a JSON user message and must answer with the JSON shape below.
pub const EVALUATION_SYSTEM: &str = "\
You are an expert ATS (Applicant Tracking System) and Resume Recruiter.
Compare the Job Description (JD) and the User Resume.
Calculate a match score (0-100) based on skills, experience, and keywords.

Return response in STRICT JSON format:
{
  \"score\": 0,
  \"suggestion\": \"Brief advice (max 20 words).\",
  \"justification\": \"Why this score? (max 20 words).\",
  \"edits\": [\"Specific edit 1\", \"Specific edit 2\", \"Specific edit 3\"]
}
";

/// Builds the user message: the JD and résumé text encoded as one JSON object.
pub fn build_evaluation_payload(job_description: &str, resume_text: &str) -> String {
    serde_json::json!({
        "job_description": job_description,
        "user_resume": resume_text,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_escapes_text() {
        let payload = build_evaluation_payload("Python \"required\"", "line one\nline two");
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["job_description"], "Python \"required\"");
        assert_eq!(value["user_resume"], "line one\nline two");
    }

    #[test]
    fn test_system_prompt_names_every_key() {
        for key in ["\"score\"", "\"suggestion\"", "\"justification\"", "\"edits\""] {
            assert!(EVALUATION_SYSTEM.contains(key), "missing {key}");
        }
    }
}
