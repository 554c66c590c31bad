//! Hallucination: is the response backed by any retrieved evidence?
//!
//! A response is flagged exactly when no grounding source came back. The
//! response text is accepted (so callers can pass it through) but does not
//! affect the verdict: there is no semantic check that the text agrees with
//! its sources, and an empty response is not itself a hallucination signal.

use crate::models::Source;

pub fn evaluate_hallucination(_response_text: &str, sources: &[Source]) -> bool {
    sources.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Source {
        Source {
            uri: Some("https://example.com/a".to_string()),
            title: "A".to_string(),
            published_at: None,
        }
    }

    #[test]
    fn test_no_sources_is_hallucinated() {
        assert!(evaluate_hallucination("The capital of Atlantis is Poseidonia.", &[]));
        assert!(evaluate_hallucination("", &[]));
    }

    #[test]
    fn test_any_source_is_grounded() {
        assert!(!evaluate_hallucination("Grounded answer [1].", &[source()]));
    }

    #[test]
    fn test_blank_text_with_sources_is_not_flagged() {
        assert!(!evaluate_hallucination("", &[source()]));
        assert!(!evaluate_hallucination("   \n\t", &[source()]));
    }

    #[test]
    fn test_text_content_never_flips_grounded_verdict() {
        let long = "long ".repeat(500);
        let texts = [
            "Cites a missing source [7].",
            "* bullet\n* list\n1. numbered",
            long.as_str(),
        ];
        for text in texts {
            assert!(!evaluate_hallucination(text, &[source()]), "text: {:?}", text);
        }
    }

    #[test]
    fn test_title_only_source_counts_as_grounding() {
        let untraceable = Source {
            uri: None,
            title: "Untraceable".to_string(),
            published_at: None,
        };
        assert!(!evaluate_hallucination("answer", &[untraceable]));
    }
}
