//! Trace assembly: the only place an [`AgentTrace`] is created.
//!
//! Verdicts arrive already computed. Assembly validates the caller-supplied
//! fields, stamps a fresh id and creation time, and does no I/O.

use crate::error::ValidationError;
use crate::models::{AgentTrace, GroundingMetadata, Verdict};

/// Build a trace from its parts.
///
/// `prompt` and `response_text` must be present but may be empty strings (an
/// empty model response is legitimate). `session_id` must be present and
/// non-blank.
pub fn assemble(
    prompt: Option<String>,
    session_id: Option<String>,
    response_text: Option<String>,
    grounding_metadata: GroundingMetadata,
    verdict: Verdict,
) -> Result<AgentTrace, ValidationError> {
    let prompt = prompt.ok_or(ValidationError::MissingField("prompt"))?;
    let response_text = response_text.ok_or(ValidationError::MissingField("response_text"))?;
    let session_id = session_id.ok_or(ValidationError::MissingField("session_id"))?;
    if session_id.trim().is_empty() {
        return Err(ValidationError::EmptyField("session_id"));
    }

    let trace = AgentTrace::new(session_id, prompt, response_text, grounding_metadata, verdict);

    tracing::debug!(
        trace_id = %trace.id(),
        session_id = %trace.session_id(),
        sources = trace.grounding_metadata().sources_count(),
        is_hallucinated = verdict.is_hallucinated,
        is_stale = verdict.is_stale,
        "Assembled agent trace"
    );

    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::Utc;

    fn grounding() -> GroundingMetadata {
        GroundingMetadata {
            search_queries: vec!["who won".to_string()],
            sources: vec![Source {
                uri: Some("https://example.com/result".to_string()),
                title: "Result".to_string(),
                published_at: None,
            }],
            supports: vec![],
        }
    }

    fn verdict() -> Verdict {
        Verdict { is_hallucinated: false, is_stale: true }
    }

    #[test]
    fn test_assemble_copies_inputs_verbatim() {
        let before = Utc::now();
        let trace = assemble(
            Some("  Who won?  ".to_string()),
            Some("session-1".to_string()),
            Some("They did [1].".to_string()),
            grounding(),
            verdict(),
        )
        .expect("valid trace");

        assert_eq!(trace.prompt(), "  Who won?  ");
        assert_eq!(trace.response_text(), "They did [1].");
        assert_eq!(trace.session_id(), "session-1");
        assert_eq!(trace.grounding_metadata(), &grounding());
        assert_eq!(trace.verdict(), verdict());
        assert!(trace.timestamp() >= before && trace.timestamp() <= Utc::now());
    }

    #[test]
    fn test_each_trace_gets_a_fresh_id() {
        let make = || {
            assemble(
                Some("p".to_string()),
                Some("s".to_string()),
                Some("r".to_string()),
                GroundingMetadata::default(),
                Verdict::default(),
            )
            .unwrap()
        };
        assert_ne!(make().id(), make().id());
    }

    #[test]
    fn test_missing_prompt_is_rejected() {
        let result = assemble(
            None,
            Some("s".to_string()),
            Some("r".to_string()),
            grounding(),
            verdict(),
        );
        assert_eq!(result.unwrap_err(), ValidationError::MissingField("prompt"));
    }

    #[test]
    fn test_missing_response_is_rejected_but_empty_is_accepted() {
        let missing = assemble(
            Some("p".to_string()),
            Some("s".to_string()),
            None,
            grounding(),
            verdict(),
        );
        assert_eq!(missing.unwrap_err(), ValidationError::MissingField("response_text"));

        let empty = assemble(
            Some(String::new()),
            Some("s".to_string()),
            Some(String::new()),
            grounding(),
            verdict(),
        );
        assert!(empty.is_ok());
    }

    #[test]
    fn test_blank_session_is_rejected() {
        let result = assemble(
            Some("p".to_string()),
            Some("   ".to_string()),
            Some("r".to_string()),
            grounding(),
            verdict(),
        );
        assert_eq!(result.unwrap_err(), ValidationError::EmptyField("session_id"));

        let result = assemble(Some("p".to_string()), None, Some("r".to_string()), grounding(), verdict());
        assert_eq!(result.unwrap_err(), ValidationError::MissingField("session_id"));
    }
}
