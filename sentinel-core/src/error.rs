use thiserror::Error;

use crate::provider::ProviderError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Other error: {0}")]
    Other(String),
}

/// A caller request is missing something the trace cannot exist without.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} field is required")]
    MissingField(&'static str),

    #[error("{0} field must not be empty")]
    EmptyField(&'static str),

    #[error("malformed request: {0}")]
    Malformed(String),
}
