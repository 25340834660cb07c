// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileValidationError {
    #[error("Provider name must not be empty")]
    MissingName,
    #[error("Capacity for provider '{0}' must be at least 1")]
    InvalidCapacity(String),
    #[error("Refill interval for provider '{0}' must be greater than 0 ms")]
    InvalidRefillInterval(String),
    #[error("Queue timeout for provider '{0}' must be greater than 0 ms when set")]
    InvalidTimeout(String),
}
