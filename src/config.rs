use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use model::{Criteria, ModelError, OrderBy, DEFAULT_ORDER_FIELD, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

/// Prefix of the environment variables read by [`AppConfig::load`],
/// e.g. `TXGRID_ENDPOINT`, `TXGRID_API_TOKEN`.
pub const ENV_PREFIX: &str = "TXGRID";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/v1/transactions";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Invalid default sort key: {0}")]
    OrderBy(#[from] ModelError),
}

/// Process-wide settings, resolved once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct AppConfig {
    /// Transactions endpoint, e.g. `https://api.example.com/v1/transactions`
    #[validate(url)]
    pub endpoint: String,

    /// Value of the `Authorization` header, sent verbatim
    pub api_token: String,

    /// Upper bound for each request
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,

    /// Quiet period before free-text input is committed
    #[validate(range(min = 1))]
    pub debounce_ms: u64,

    #[validate(range(min = 1, max = 1000))]
    pub default_page_size: u32,

    /// Initial sort key in wire form; empty for server order
    pub default_order_by: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: String::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_page_size: DEFAULT_PAGE_SIZE.get(),
            default_order_by: DEFAULT_ORDER_FIELD.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional config file, then `.env` and `TXGRID_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(path, Some(Environment::with_prefix(ENV_PREFIX)))
    }

    /// Same as [`AppConfig::load`] with an explicit environment source.
    pub fn from_sources(path: Option<&Path>, environment: Option<Environment>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("endpoint", defaults.endpoint)?
            .set_default("api_token", defaults.api_token)?
            .set_default("request_timeout_ms", defaults.request_timeout_ms)?
            .set_default("debounce_ms", defaults.debounce_ms)?
            .set_default("default_page_size", u64::from(defaults.default_page_size))?
            .set_default("default_order_by", defaults.default_order_by)?;

        if let Some(path) = path {
            tracing::debug!("Reading configuration file {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        config.initial_order_by()?;
        tracing::debug!("Configuration loaded for endpoint {}", config.endpoint);
        Ok(config)
    }

    /// Replaces endpoint and token when given, then re-validates.
    pub fn with_overrides(mut self, endpoint: Option<String>, api_token: Option<String>) -> Result<Self, ConfigError> {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(api_token) = api_token {
            self.api_token = api_token;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.default_page_size).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn initial_order_by(&self) -> Result<Option<OrderBy>, ModelError> {
        if self.default_order_by.trim().is_empty() {
            return Ok(None);
        }
        self.default_order_by.parse().map(Some)
    }

    /// Criteria a fresh session starts from.
    pub fn initial_criteria(&self) -> Result<Criteria, ConfigError> {
        Ok(Criteria {
            order_by: self.initial_order_by()?,
            page_size: self.page_size(),
            ..Criteria::default()
        })
    }
}
