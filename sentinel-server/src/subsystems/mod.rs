pub mod log_trace;
pub mod query;
pub mod traces;
