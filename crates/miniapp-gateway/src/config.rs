//! Configuration for the gateway.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Gateway configuration.
///
/// Built once at start-up from the environment and handed to the
/// application state; request handlers never read the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Leadteh read-API token (`LEADTEH_API_TOKEN`)
    #[serde(default)]
    pub leadteh_api_token: Option<SecretString>,

    /// Telegram bot token used to verify Mini App initData (`TELEGRAM_BOT_TOKEN`)
    #[serde(default)]
    pub telegram_bot_token: Option<SecretString>,

    /// Leadteh endpoints
    #[serde(default)]
    pub leadteh: LeadtehConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadtehConfig {
    /// Read API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Inner webhook receiving registrations
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// Bot whose contacts are searched
    #[serde(default = "default_bot_id")]
    pub bot_id: u64,

    /// Contacts requested per lookup
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Outbound request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from the Mini App
    #[serde(default = "default_true")]
    pub cors: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global submissions per minute (0 disables the limiter)
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Secrets the handlers need, with empty values treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    leadteh_api_token: Option<SecretString>,
    telegram_bot_token: Option<SecretString>,
}

impl Credentials {
    pub fn new(
        leadteh_api_token: Option<SecretString>,
        telegram_bot_token: Option<SecretString>,
    ) -> Self {
        Self {
            leadteh_api_token: leadteh_api_token.filter(|s| !s.expose_secret().is_empty()),
            telegram_bot_token: telegram_bot_token.filter(|s| !s.expose_secret().is_empty()),
        }
    }

    /// Token for the Leadteh read API; `None` disables contact prefill.
    pub fn leadteh_api_token(&self) -> Option<&SecretString> {
        self.leadteh_api_token.as_ref()
    }

    /// Bot token for initData verification; `None` skips verification.
    pub fn telegram_bot_token(&self) -> Option<&SecretString> {
        self.telegram_bot_token.as_ref()
    }
}

// Default implementations
impl Default for LeadtehConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            webhook_url: default_webhook_url(),
            bot_id: default_bot_id(),
            page_size: default_page_size(),
            timeout: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            cors: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_api_url() -> String {
    "https://app.leadteh.ru/api/v1".into()
}

fn default_webhook_url() -> String {
    "https://rb257034.leadteh.ru/inner_webhook/4889c51b-0bd8-42bd-979e-3bf67dbcece5".into()
}

fn default_bot_id() -> u64 {
    257034
}

fn default_page_size() -> u32 {
    500
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_per_minute() -> u32 {
    0
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                environment
                    .separator("__")
                    // Keep "+7..." and numeric-looking tokens as strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Handler-facing view of the configured secrets.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.leadteh_api_token.clone(),
            self.telegram_bot_token.clone(),
        )
    }
}
