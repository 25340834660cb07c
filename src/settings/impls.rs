// Standard library
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

// 3rd party crates
use config::{Config, ConfigError, Environment, File};
use log::{error, info, LevelFilter};
use tokio::sync::RwLock;

// Project imports
use crate::providers::errors::ProfileValidationError;
use crate::providers::types::ProviderTable;
use crate::utility::rate_limiter::TokenBucketRateLimiter;

// Current module imports
use super::constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG, ENVIRONMENTS, ENV_PREFIX, LOG_LEVELS};
use super::errors::ValidationError;
use super::types::{ConfigManager, Settings, ValidatedSettings};

impl Settings {
    pub fn get_log_level(&self) -> String {
        self.log.level.to_lowercase()
    }

    pub fn get_environment(&self) -> String {
        self.app.environment.to_lowercase()
    }

    pub fn is_development(&self) -> bool {
        self.get_environment() == "development"
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.limiter.default_timeout_ms)
    }

    /// Built-in provider profiles overlaid with the configured ones.
    pub fn provider_table(&self) -> ProviderTable {
        ProviderTable::merged(&self.providers)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Validate log level
        if !LOG_LEVELS.contains(&self.get_log_level().as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.log.level.clone()));
        }

        if !ENVIRONMENTS.contains(&self.get_environment().as_str()) {
            return Err(ValidationError::InvalidEnvironment(
                self.app.environment.clone(),
            ));
        }

        if self.limiter.default_timeout_ms == 0 {
            return Err(ValidationError::InvalidDefaultTimeout(
                self.limiter.default_timeout_ms,
            ));
        }

        // Validate every profile the limiter will run with
        self.provider_table().validate()?;

        Ok(())
    }
}

impl ConfigManager {
    /// Creates a new `ConfigManager` instance by loading and validating the configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path: PathBuf = Self::get_config_path()?;
        Self::from_path(config_path).await
    }

    /// Same as `new` with an explicit configuration file.
    pub async fn from_path(config_path: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        Self::ensure_config_file_exists(&config_path)?;

        let settings: Settings = Self::load_settings(&config_path)?;

        // Validate settings before proceeding
        let validated_settings = ValidatedSettings::new(settings).map_err(|e| {
            error!("Configuration validation failed: {}", e);
            e
        })?;
        info!(
            "Loaded settings for the '{}' environment",
            validated_settings.get_environment()
        );

        let manager = ConfigManager {
            settings: Arc::new(RwLock::new(validated_settings.into_inner())),
            config_path,
        };

        manager.adjust_logging_level().await;

        Ok(manager)
    }

    /// Determines the configuration file path.
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            Ok(PathBuf::from(path))
        } else if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("studio-limiter").join("config.toml"))
        } else {
            let msg: &str = "Could not determine the configuration directory";
            error!("{}", msg);
            Err(ConfigError::Message(msg.into()))
        }
    }

    /// Ensures that the configuration file exists, creating it if necessary.
    fn ensure_config_file_exists(config_path: &Path) -> Result<(), ConfigError> {
        if !config_path.exists() {
            if let Some(parent_dir) = config_path.parent() {
                fs::create_dir_all(parent_dir).map_err(|e| {
                    let msg: String = format!("Failed to create configuration directory: {}", e);
                    error!("{}", msg);
                    ConfigError::Message(msg)
                })?;
            }
            fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                let msg: String = format!("Failed to create default configuration file: {}", e);
                error!("{}", msg);
                ConfigError::Message(msg)
            })?;
            info!("Default configuration file created at: {:?}", config_path);
        }
        Ok(())
    }

    /// Loads the settings from the configuration file and environment variables.
    fn load_settings(config_path: &Path) -> Result<Settings, ConfigError> {
        let config_file: &str = config_path.to_str().ok_or_else(|| {
            let msg: &str = "Configuration file path contains invalid UTF-8 characters";
            error!("{}", msg);
            ConfigError::Message(msg.into())
        })?;

        let settings: Config = Config::builder()
            .add_source(File::with_name(config_file))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Adjusts the logging level based on the configuration.
    async fn adjust_logging_level(&self) {
        let level: String = self.get_log_level().await;
        let level_filter: LevelFilter = match level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        };
        log::set_max_level(level_filter);
    }

    /// Provides a read-locked reference to the current settings.
    pub async fn get_settings(&self) -> tokio::sync::RwLockReadGuard<'_, Settings> {
        self.settings.read().await
    }

    pub async fn get_log_level(&self) -> String {
        self.settings.read().await.get_log_level()
    }

    pub async fn get_environment(&self) -> String {
        self.settings.read().await.get_environment()
    }

    pub async fn is_development(&self) -> bool {
        self.settings.read().await.is_development()
    }

    /// Builds a rate limiter from the configured provider profiles.
    pub async fn build_limiter(&self) -> Result<TokenBucketRateLimiter, ProfileValidationError> {
        let settings = self.settings.read().await;
        let table: ProviderTable = settings.provider_table();
        info!(
            "Rate limiter configured for {} provider(s), default timeout {} ms",
            table.profiles.len(),
            settings.limiter.default_timeout_ms
        );
        TokenBucketRateLimiter::new(table, settings.default_timeout())
    }
}

impl ValidatedSettings {
    pub fn new(settings: Settings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(ValidatedSettings(settings))
    }

    pub fn into_inner(self) -> Settings {
        self.0
    }
}

// Implement Deref to allow transparent access to Settings fields
impl std::ops::Deref for ValidatedSettings {
    type Target = Settings;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
