use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 45;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration with validation.
///
/// Values come from built-in defaults, optional `config/{default,<env>}.toml`
/// files, and `APP__`-prefixed environment variables, in that order.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Runtime environment name ("development", "production", "test")
    pub environment: String,

    /// Log level when RUST_LOG is not set
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Run schema migrations at startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Payment gateway API base URL
    #[validate(length(min = 1))]
    pub gateway_base_url: String,

    /// Payment gateway secret key (bearer credential for verify calls)
    #[validate(length(min = 1))]
    pub gateway_secret_key: String,

    /// Pre-shared secret the gateway echoes in the webhook `verif-hash` header
    #[validate(length(min = 8))]
    pub webhook_secret: String,

    /// Fulfillment provider base URL
    #[validate(length(min = 1))]
    pub fulfillment_base_url: String,

    /// Fulfillment provider API key
    #[validate(length(min = 1))]
    pub fulfillment_api_key: String,

    /// Timeout for outbound gateway/fulfillment calls, in seconds
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_secs: u64,

    /// Timeout applied to inbound requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_outbound_timeout() -> u64 {
    DEFAULT_OUTBOUND_TIMEOUT_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl AppConfig {
    /// Construct a configuration directly, bypassing file/env sources.
    /// Used by tests and embedded setups.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database_url: String,
        host: String,
        port: u16,
        environment: String,
        gateway_base_url: String,
        gateway_secret_key: String,
        webhook_secret: String,
        fulfillment_base_url: String,
        fulfillment_api_key: String,
    ) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            gateway_base_url,
            gateway_secret_key,
            webhook_secret,
            fulfillment_base_url,
            fulfillment_api_key,
            outbound_timeout_secs: default_outbound_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Load configuration from defaults, optional config files and environment.
///
/// The gateway and fulfillment credentials have no defaults and MUST be
/// provided via environment variables or a config file.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://topup.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("auto_migrate", true)?
        .set_default("outbound_timeout_secs", DEFAULT_OUTBOUND_TIMEOUT_SECS)?
        .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
        .set_default("gateway_base_url", "https://api.flutterwave.com")?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;

    Ok(config)
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("topup_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
