#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::http::DEFAULT_USER_AGENT;
use crate::domain::ports::{ConfigProvider, Environment};
use crate::utils::error::Result;
use crate::utils::validation::{validate_api_key, validate_non_empty_string, validate_positive_number, validate_url, Validate};
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Plain in-code client settings.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub environment: Environment,
    pub base_url: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            environment: Environment::default(),
            base_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: None,
        }
    }

    /// Copy every setting out of another provider.
    pub fn from_provider<C: ConfigProvider + ?Sized>(provider: &C) -> Self {
        Self {
            api_key: provider.api_key().to_string(),
            environment: provider.environment(),
            base_url: provider.base_url().map(str::to_string),
            api_version: provider.api_version().to_string(),
            timeout: provider.timeout(),
            max_retries: provider.max_retries(),
            retry_delay: provider.retry_delay(),
            user_agent: provider.user_agent().map(str::to_string),
        }
    }
}

impl ConfigProvider for ClientConfig {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn environment(&self) -> Environment {
        self.environment
    }

    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref().or(Some(DEFAULT_USER_AGENT))
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_api_key(&self.api_key)?;
        validate_url("base_url", &self.resolved_base_url())?;
        validate_non_empty_string("api_version", &self.api_version)?;
        validate_positive_number("timeout", self.timeout.as_millis() as u64, 1)?;
        Ok(())
    }
}
