use crate::domain::model::WebhookEvent;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Deployment the client talks to when no explicit base URL is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.jewelmusic.art",
            Environment::Sandbox => "https://api-sandbox.jewelmusic.art",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = crate::utils::error::JewelMusicError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            other => Err(crate::utils::error::JewelMusicError::InvalidConfigValueError {
                field: "environment".to_string(),
                value: other.to_string(),
                reason: "Expected 'production' or 'sandbox'".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = crate::utils::error::JewelMusicError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Source of client settings: CLI flags, a TOML file, or a plain struct.
pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn environment(&self) -> Environment;
    /// Overrides the environment's URL when set.
    fn base_url(&self) -> Option<&str>;
    fn api_version(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn max_retries(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn user_agent(&self) -> Option<&str>;

    fn resolved_base_url(&self) -> String {
        self.base_url()
            .unwrap_or_else(|| self.environment().base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Receives verified webhook events routed by event type.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> Result<()>;
}
