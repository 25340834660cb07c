//! Development console for looking at and clearing limiter state.
//!
//! Commands are read one per line and answered with JSON:
//!
//! ```text
//! status <provider> <user>
//! all <user>
//! next <provider> <user>
//! acquire <provider> <user> [timeout_ms]
//! try <provider> <user>
//! reset [provider|*] [user|*]
//! providers
//! metrics
//! help
//! quit
//! ```

pub mod constants;
pub mod errors;
pub mod impls;
pub mod types;

pub use errors::InspectorError;
pub use types::{Command, Inspector};
