// Standard library
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

// 3rd party crates
use serde::Deserialize;
use tokio::sync::RwLock;

// Project imports
use crate::providers::constants::default_timeout_ms;
use crate::providers::types::ProviderProfile;

#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limiter {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub limiter: Limiter,

    /// Overrides and additions to the built-in provider profiles
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderProfile>,
}

/// Settings that passed `Settings::validate`.
#[derive(Debug, Clone)]
pub struct ValidatedSettings(pub(crate) Settings);

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            environment: default_environment(),
        }
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

/// Manages the application settings, loaded once at start up.
pub struct ConfigManager {
    pub settings: Arc<RwLock<Settings>>,
    pub config_path: PathBuf,
}
