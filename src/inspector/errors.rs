// 3rd party crates
use thiserror::Error;

// Project imports
use crate::utility::rate_limiter::RateLimitError;

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}', type 'help' for the list of commands")]
    UnknownCommand(String),
    #[error("Command '{command}' is missing the <{argument}> argument")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("Command '{0}' got too many arguments")]
    TooManyArguments(&'static str),
    #[error("Invalid timeout '{0}', expected milliseconds")]
    InvalidTimeout(String),
    #[error(transparent)]
    Limiter(#[from] RateLimitError),
}
