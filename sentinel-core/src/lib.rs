pub mod advisory;
pub mod assembler;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod grounding;
pub mod hallucination;
pub mod models;
pub mod protocol;
pub mod provider;
pub mod staleness;
pub mod store;
pub mod verdict;

pub use advisory::GroundingAdvisory;
pub use assembler::assemble;
pub use config::SentinelConfig;
pub use error::{SentinelError, ValidationError};
pub use grounding::{extract, MalformedPayload};
pub use hallucination::evaluate_hallucination;
pub use models::{AgentTrace, GroundingMetadata, Source, Verdict};
pub use provider::{
    GeminiClient, GeminiConfig, GroundedProvider, ProviderError, ProviderResponse, UnavailableProvider,
};
pub use staleness::{evaluate_staleness, StalenessEvaluator, StalenessPolicy};
pub use store::{MemoryTraceStore, PgTraceStore, StoreError, TraceQuery, TraceStore};
