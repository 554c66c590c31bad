use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::source::{GroundingMetadata, Verdict};

/// Durable record of one processed query. Only the trace assembler builds
/// one (stored rows come back through `FromRow`); fields are read-only
/// afterwards. Serialize-only: a trace cannot be built from caller JSON.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AgentTrace {
    id: Uuid,
    session_id: String,
    timestamp: DateTime<Utc>,
    prompt: String,
    response_text: String,
    #[sqlx(json)]
    grounding_metadata: GroundingMetadata,
    is_hallucinated: bool,
    is_stale: bool,
}

impl AgentTrace {
    pub(crate) fn new(
        session_id: String,
        prompt: String,
        response_text: String,
        grounding_metadata: GroundingMetadata,
        verdict: Verdict,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            timestamp: Utc::now(),
            prompt,
            response_text,
            grounding_metadata,
            is_hallucinated: verdict.is_hallucinated,
            is_stale: verdict.is_stale,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn grounding_metadata(&self) -> &GroundingMetadata {
        &self.grounding_metadata
    }

    pub fn verdict(&self) -> Verdict {
        Verdict {
            is_hallucinated: self.is_hallucinated,
            is_stale: self.is_stale,
        }
    }

    pub fn is_hallucinated(&self) -> bool {
        self.is_hallucinated
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale
    }
}
