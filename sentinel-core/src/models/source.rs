use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of grounding evidence returned by the search capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Source {
    /// Publication date usable as age evidence. A source without a URI
    /// cannot be dated, whatever the provider claimed.
    pub fn dated(&self) -> Option<DateTime<Utc>> {
        self.uri.as_ref().and(self.published_at)
    }
}

/// Canonical grounding for one query. `sources` is what both evaluators read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingMetadata {
    #[serde(default)]
    pub search_queries: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Span-to-source linkage, passed through verbatim from the provider.
    #[serde(default)]
    pub supports: Vec<serde_json::Value>,
}

impl GroundingMetadata {
    pub fn sources_count(&self) -> usize {
        self.sources.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_hallucinated: bool,
    pub is_stale: bool,
}
