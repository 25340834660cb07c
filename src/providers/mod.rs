pub mod constants;
pub mod errors;
pub mod impls;
pub mod types;

pub use errors::ProfileValidationError;
pub use types::{ProviderProfile, ProviderTable};
