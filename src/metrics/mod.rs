pub mod types;

pub use types::{LimiterMetrics, MetricsManager};
