//! Staleness: is the grounding evidence that exists too old to count as
//! current knowledge?
//!
//! Age is `now - published_at`; a source is stale when its age exceeds the
//! threshold. Undated sources (including every source without a URI) carry
//! no age evidence and never take part in the overall verdict. With the
//! default policy, one fresh dated source clears the verdict.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::models::Source;

/// Roughly six months.
pub const DEFAULT_THRESHOLD_DAYS: i64 = 180;

/// How individual source ages combine into the overall verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessPolicy {
    /// Stale only when at least one source is dated and every dated source is stale.
    #[default]
    AllDatedStale,
    /// Stale when any dated source is stale.
    AnyDatedStale,
}

/// Stateless evaluator carrying the injected threshold and policy.
#[derive(Debug, Clone, Copy)]
pub struct StalenessEvaluator {
    threshold: Duration,
    policy: StalenessPolicy,
}

impl Default for StalenessEvaluator {
    fn default() -> Self {
        Self::new(Duration::days(DEFAULT_THRESHOLD_DAYS), StalenessPolicy::default())
    }
}

impl StalenessEvaluator {
    pub fn new(threshold: Duration, policy: StalenessPolicy) -> Self {
        Self { threshold, policy }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    pub fn evaluate(&self, sources: &[Source], now: DateTime<Utc>) -> bool {
        let mut dated = sources
            .iter()
            .filter_map(Source::dated)
            .map(|published_at| is_older_than(published_at, now, self.threshold))
            .peekable();

        if dated.peek().is_none() {
            return false;
        }

        match self.policy {
            StalenessPolicy::AllDatedStale => dated.all(|stale| stale),
            StalenessPolicy::AnyDatedStale => dated.any(|stale| stale),
        }
    }
}

/// Overall staleness with the default policy.
pub fn evaluate_staleness(sources: &[Source], now: DateTime<Utc>, threshold: Duration) -> bool {
    StalenessEvaluator::new(threshold, StalenessPolicy::AllDatedStale).evaluate(sources, now)
}

/// Whether one source is individually stale. Undated sources never are.
pub fn source_is_stale(source: &Source, now: DateTime<Utc>, threshold: Duration) -> bool {
    source
        .dated()
        .is_some_and(|published_at| is_older_than(published_at, now, threshold))
}

fn is_older_than(published_at: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    // Future dates give a negative age and count as fresh.
    now.signed_duration_since(published_at) > threshold
}
