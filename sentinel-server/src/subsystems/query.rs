//! One query cycle: provider call -> extraction -> verdicts -> assembly -> persistence.
//!
//! Nothing is persisted until the trace is fully assembled. Provider and
//! store failures propagate unchanged; there is no retry at this layer.

use chrono::{DateTime, Utc};
use sentinel_core::advisory::GroundingAdvisory;
use sentinel_core::error::{SentinelError, ValidationError};
use sentinel_core::models::{AgentTrace, GroundingMetadata};
use sentinel_core::provider::GroundedProvider;
use sentinel_core::staleness::StalenessEvaluator;
use sentinel_core::store::TraceStore;
use sentinel_core::{assemble, extract, verdict};
use serde::Serialize;
use uuid::Uuid;

/// What the caller gets back for one processed query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub trace_id: Uuid,
    pub response: String,
    pub grounding_metadata: GroundingMetadata,
    pub is_hallucinated: bool,
    pub is_stale: bool,
    pub sources_count: usize,
    pub confidence_score: f64,
    pub warning: Option<String>,
    pub ghost_citation: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl QueryResponse {
    pub fn new(trace: &AgentTrace, advisory: GroundingAdvisory) -> Self {
        Self {
            trace_id: trace.id(),
            response: trace.response_text().to_string(),
            grounding_metadata: trace.grounding_metadata().clone(),
            is_hallucinated: trace.is_hallucinated(),
            is_stale: trace.is_stale(),
            sources_count: trace.grounding_metadata().sources_count(),
            confidence_score: advisory.confidence_score,
            warning: advisory.warning,
            ghost_citation: advisory.ghost_citation,
            timestamp: trace.timestamp(),
        }
    }
}

pub async fn run_query(
    prompt: Option<String>,
    session_id: Option<String>,
    provider: &dyn GroundedProvider,
    store: &dyn TraceStore,
    staleness: &StalenessEvaluator,
) -> Result<QueryResponse, SentinelError> {
    // Reject before spending a provider call on a request that cannot be traced.
    let prompt = required(prompt, "prompt")?;
    let session_id = required(session_id, "session_id")?;

    let generated = provider.generate(&prompt).await?;
    let grounding = extract(&generated.grounding);
    let verdict = verdict::evaluate(&generated.text, &grounding, staleness, Utc::now());
    let advisory = GroundingAdvisory::assess(&generated.text, &grounding, verdict);

    let trace = assemble(
        Some(prompt),
        Some(session_id),
        Some(generated.text),
        grounding,
        verdict,
    )?;

    store.insert(&trace).await?;

    tracing::info!(
        trace_id = %trace.id(),
        session_id = %trace.session_id(),
        provider = provider.name(),
        sources = trace.grounding_metadata().sources_count(),
        is_hallucinated = verdict.is_hallucinated,
        is_stale = verdict.is_stale,
        "Query traced"
    );

    Ok(QueryResponse::new(&trace, advisory))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(ValidationError::EmptyField(field)),
        None => Err(ValidationError::MissingField(field)),
    }
}
