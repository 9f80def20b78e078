use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub media: MediaConfig,
    pub checkout: CheckoutConfig,
    pub webhook: WebhookConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Buffer period a claimant has to complete payment before the cell
    /// can be claimed by someone else
    pub reservation_window_seconds: u64,
    pub range_cache_ttl_seconds: u64,
    pub max_image_bytes: usize,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

fn default_rate_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Root directory the media store writes image objects under
    pub root: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub api_url: String,
    pub api_key: String,
    pub store_id: String,
    pub variant_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub signing_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of MOSAIC)
            // Eg. `MOSAIC__SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("MOSAIC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
