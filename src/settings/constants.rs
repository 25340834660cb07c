/// Example configuration
pub const DEFAULT_CONFIG: &str = r#"
# Logging configuration
[log]
# Level can be "error", "warn", "info", "debug", or "trace"
level = "info"

# Application environment, "development" or "production".
# The inspection console only starts in development; set
# environment = "development" here or export
# STUDIO_LIMITER__APP__ENVIRONMENT=development to enable it.
[app]
environment = "production"

# Rate limiter configuration
[limiter]
# Queue timeout in milliseconds for providers without their own
default_timeout_ms = 30000

# Provider quota profiles (optional)
# A profile replaces the built-in one of the same name, new names add providers.
# capacity: maximum burst of requests
# refill_interval_ms: time to regenerate one request
# timeout_ms: optional queue timeout for this provider
[providers.openai]
capacity = 60
refill_interval_ms = 1000

[providers.gemini]
capacity = 15
refill_interval_ms = 4000

[providers.ai_validate]
capacity = 10
refill_interval_ms = 6000
timeout_ms = 10000
"#;

/// Environment variable pointing at a configuration file
pub const CONFIG_PATH_ENV: &str = "STUDIO_LIMITER_CONFIG_PATH";

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "STUDIO_LIMITER";

pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub const ENVIRONMENTS: [&str; 2] = ["development", "production"];
