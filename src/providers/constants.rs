/// Queue timeout used when neither the caller nor the provider profile sets one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Built-in quota profiles: `(provider, capacity, refill_interval_ms, timeout_ms)`.
pub const DEFAULT_PROFILES: [(&str, u32, u64, Option<u64>); 5] = [
    // 60 requests per minute
    ("openai", 60, 1_000, None),
    // 50 requests per minute
    ("anthropic", 50, 1_200, None),
    // 15 requests per minute on the free tier
    ("gemini", 15, 4_000, None),
    ("mistral", 60, 1_000, None),
    // API key validation calls, 10 per minute with a short queue
    ("ai_validate", 10, 6_000, Some(10_000)),
];

pub fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
