use chrono::{DateTime, Utc};

use crate::hallucination::evaluate_hallucination;
use crate::models::{GroundingMetadata, Verdict};
use crate::staleness::StalenessEvaluator;

/// Run both evaluators over the same canonical source list.
pub fn evaluate(
    response_text: &str,
    grounding: &GroundingMetadata,
    staleness: &StalenessEvaluator,
    now: DateTime<Utc>,
) -> Verdict {
    Verdict {
        is_hallucinated: evaluate_hallucination(response_text, &grounding.sources),
        is_stale: staleness.evaluate(&grounding.sources, now),
    }
}
