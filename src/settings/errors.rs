// 3rd party crates
use thiserror::Error;

// Project imports
use crate::providers::errors::ProfileValidationError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0}. Must be one of: error, warn, info, debug, trace")]
    InvalidLogLevel(String),
    #[error("Invalid environment: {0}. Must be one of: development, production")]
    InvalidEnvironment(String),
    #[error("Default timeout must be greater than 0 ms, got {0}")]
    InvalidDefaultTimeout(u64),
    #[error("Provider configuration error: {0}")]
    ProviderConfig(#[from] ProfileValidationError),
}
