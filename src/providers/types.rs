// Standard library
use std::collections::BTreeMap;

// 3rd party crates
use serde::Deserialize;

/// Quota profile of a single rate-limited provider.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Maximum tokens a bucket can hold
    pub capacity: u32,
    /// Milliseconds needed to regenerate one token
    pub refill_interval_ms: u64,
    /// Queue timeout for this provider, falls back to the limiter default
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Immutable table of every configured provider, keyed by provider name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderTable {
    pub profiles: BTreeMap<String, ProviderProfile>,
}
