use crate::config::ClientConfig;
use crate::core::http::HttpClient;
use crate::core::params::Params;
use crate::domain::model::{PingResponse, RateLimitInfo, UserProfile};
use crate::domain::ports::{ConfigProvider, Environment};
use crate::resources::{Analysis, Analytics, Copilot, Distribution, Tracks, Transcription, User, Webhooks};
use crate::utils::error::Result;
use serde_json::Value;
use std::time::Duration;

/// Entry point for the JewelMusic API.
///
/// ```no_run
/// # async fn run() -> jewelmusic::Result<()> {
/// let client = jewelmusic::JewelMusic::new("jml_live_...")?;
/// let pong = client.ping().await?;
/// println!("API {}", pong.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JewelMusic {
    http: HttpClient,
}

impl JewelMusic {
    /// Production client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> JewelMusicBuilder {
        JewelMusicBuilder {
            config: ClientConfig::new(api_key),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let http = HttpClient::from_config(config)?;
        tracing::debug!("JewelMusic client ready for {}", http.base_url());
        Ok(Self { http })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Latest `X-RateLimit-*` values seen from the server.
    pub async fn rate_limit(&self) -> RateLimitInfo {
        self.http.rate_limit().await
    }

    pub async fn ping(&self) -> Result<PingResponse> {
        self.http.get("/ping", &Params::new()).await
    }

    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.user().profile().await
    }

    pub async fn get_usage(&self) -> Result<Value> {
        self.user().usage_stats(None).await
    }

    pub fn tracks(&self) -> Tracks<'_> {
        Tracks::new(&self.http)
    }

    pub fn analysis(&self) -> Analysis<'_> {
        Analysis::new(&self.http)
    }

    pub fn copilot(&self) -> Copilot<'_> {
        Copilot::new(&self.http)
    }

    pub fn distribution(&self) -> Distribution<'_> {
        Distribution::new(&self.http)
    }

    pub fn transcription(&self) -> Transcription<'_> {
        Transcription::new(&self.http)
    }

    pub fn analytics(&self) -> Analytics<'_> {
        Analytics::new(&self.http)
    }

    pub fn user(&self) -> User<'_> {
        User::new(&self.http)
    }

    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(&self.http)
    }
}

#[derive(Debug, Clone)]
pub struct JewelMusicBuilder {
    config: ClientConfig,
}

impl JewelMusicBuilder {
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Takes precedence over [`environment`](Self::environment).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = api_version.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Base delay for exponential backoff between retries.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build(self) -> Result<JewelMusic> {
        JewelMusic::from_config(&self.config)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Client pointed at an unroutable address; only for tests that fail before sending.
    pub(crate) fn offline_client() -> JewelMusic {
        JewelMusic::builder("jml_test_offline")
            .base_url("http://127.0.0.1:9")
            .max_retries(0)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap()
    }
}
