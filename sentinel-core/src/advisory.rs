//! Grounding advisory: display-only signals reported next to the verdict.
//!
//! None of these feed back into `is_hallucinated` or `is_stale`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{GroundingMetadata, Verdict};

pub const UNSUPPORTED_WARNING: &str = "Unverified data: no grounding supports";

/// Sources beyond this add nothing more to the confidence score.
const SOURCE_SATURATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingAdvisory {
    pub confidence_score: f64,
    pub warning: Option<String>,
    /// Highest `[n]` citation in the response that has no matching source.
    pub ghost_citation: Option<u32>,
}

impl GroundingAdvisory {
    pub fn assess(response_text: &str, grounding: &GroundingMetadata, verdict: Verdict) -> Self {
        let warning = (!verdict.is_hallucinated && grounding.supports.is_empty())
            .then(|| UNSUPPORTED_WARNING.to_string());

        Self {
            confidence_score: confidence_score(grounding),
            warning,
            ghost_citation: ghost_citation(response_text, grounding.sources.len()),
        }
    }
}

/// 0.4 for having sources, 0.4 for having supports, up to 0.2 for source count.
pub fn confidence_score(grounding: &GroundingMetadata) -> f64 {
    let sources = grounding.sources.len() as f64;
    let mut score = 0.0;

    if sources > 0.0 {
        score += 0.4;
    }
    if !grounding.supports.is_empty() {
        score += 0.4;
    }
    score += (sources / SOURCE_SATURATION).min(1.0) * 0.2;

    (score * 100.0).round() / 100.0
}

/// The largest citation marker that points past the end of the source list.
pub fn ghost_citation(response_text: &str, sources_count: usize) -> Option<u32> {
    let re = Regex::new(r"\[(\d{1,4})\]").ok()?;
    re.captures_iter(response_text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .filter(|&highest| highest as usize > sources_count)
}
