//! Manual logging: record a trace that was produced elsewhere.
//!
//! The submitted grounding payload goes through the same extractor as a
//! provider response. Verdicts the caller supplies are kept as-is; missing
//! ones are computed.

use chrono::Utc;
use sentinel_core::error::{SentinelError, ValidationError};
use sentinel_core::models::{AgentTrace, Verdict};
use sentinel_core::staleness::StalenessEvaluator;
use sentinel_core::store::TraceStore;
use sentinel_core::{assemble, extract, verdict};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TraceSubmission {
    pub prompt: Option<String>,
    pub session_id: Option<String>,
    pub response_text: Option<String>,
    #[serde(default)]
    pub grounding_metadata: serde_json::Value,
    pub is_hallucinated: Option<bool>,
    pub is_stale: Option<bool>,
}

impl TraceSubmission {
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(payload).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}

pub async fn log_trace(
    payload: serde_json::Value,
    store: &dyn TraceStore,
    staleness: &StalenessEvaluator,
) -> Result<AgentTrace, SentinelError> {
    let submission = TraceSubmission::from_payload(payload)?;

    let grounding = extract(&submission.grounding_metadata);
    let computed = verdict::evaluate(
        submission.response_text.as_deref().unwrap_or_default(),
        &grounding,
        staleness,
        Utc::now(),
    );
    let verdict = Verdict {
        is_hallucinated: submission.is_hallucinated.unwrap_or(computed.is_hallucinated),
        is_stale: submission.is_stale.unwrap_or(computed.is_stale),
    };

    let trace = assemble(
        submission.prompt,
        submission.session_id,
        submission.response_text,
        grounding,
        verdict,
    )?;

    store.insert(&trace).await?;

    tracing::info!(
        trace_id = %trace.id(),
        session_id = %trace.session_id(),
        "Manually logged trace"
    );

    Ok(trace)
}
