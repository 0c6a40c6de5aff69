use crate::config::{DEFAULT_API_VERSION, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
use crate::domain::ports::{ConfigProvider, Environment};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_api_key, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Client settings loaded from a TOML file.
///
/// ```toml
/// [client]
/// api_key = "${JEWELMUSIC_API_KEY}"
/// environment = "sandbox"
///
/// [retry]
/// max_retries = 5
///
/// [logging]
/// format = "json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub client: ClientSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    pub api_key: String,
    #[serde(default)]
    pub environment: Environment,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub format: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate. `${VAR}` references are replaced from the environment first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        let config: Self = toml::from_str(&processed).map_err(|e| JewelMusicError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Unset variables are left as the literal `${VAR}` text.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if env_var_pattern().is_match(&self.client.api_key) {
            return Err(JewelMusicError::MissingConfigError {
                field: format!("client.api_key ({})", self.client.api_key),
            });
        }
        validate_api_key(&self.client.api_key)?;

        if let Some(base_url) = &self.client.base_url {
            validate_url("client.base_url", base_url)?;
        }

        if let Some(timeout) = self.client.timeout_seconds {
            validate_positive_number("client.timeout_seconds", timeout, 1)?;
        }

        if let Some(format) = &self.logging.format {
            if LogFormat::parse(format).is_none() {
                return Err(JewelMusicError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.clone(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .format
            .as_deref()
            .and_then(LogFormat::parse)
            .unwrap_or_default()
    }

    pub fn verbose(&self) -> bool {
        self.logging.verbose.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_key(&self) -> &str {
        &self.client.api_key
    }

    fn environment(&self) -> Environment {
        self.client.environment
    }

    fn base_url(&self) -> Option<&str> {
        self.client.base_url.as_deref()
    }

    fn api_version(&self) -> &str {
        self.client.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    fn timeout(&self) -> Duration {
        self.client
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn max_retries(&self) -> u32 {
        self.retry.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    fn retry_delay(&self) -> Duration {
        self.retry
            .retry_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY)
    }

    fn user_agent(&self) -> Option<&str> {
        self.client.user_agent.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
