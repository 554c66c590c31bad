pub mod source;
pub mod trace;

pub use source::{GroundingMetadata, Source, Verdict};
pub use trace::AgentTrace;
