// Standard library
use std::time::Duration;

/// Buckets below this fill level report `StatusLevel::Degraded`.
pub const DEGRADED_BELOW_PERCENT: f64 = 50.0;

/// Deadline used when a caller asks for a timeout too large to represent.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);
