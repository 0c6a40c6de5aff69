use crate::core::params::Params;
use crate::domain::model::{RateLimitInfo, ResponseMeta};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::{validate_api_key, validate_url};
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("JewelMusic-Rust-SDK/", env!("CARGO_PKG_VERSION"));

const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// Below this many remaining requests the client waits for the window to reset.
const RATE_LIMIT_LOW_WATER: u64 = 5;

/// A file sent as the `file` part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for_extension)
            .map(str::to_string);

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn mime(&self) -> &str {
        self.content_type.as_deref().unwrap_or("application/octet-stream")
    }
}

fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "flac" => Some("audio/flac"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" => Some("audio/ogg"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Authenticated transport for the JewelMusic REST API.
///
/// Adds auth headers, retries 429/5xx/connection failures with exponential
/// backoff, tracks the server's rate-limit headers, and unwraps the
/// `{success, data, meta, error}` envelope.
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_version: String,
    api_key: String,
    max_retries: u32,
    retry_delay: Duration,
    rate_limit: Mutex<RateLimitInfo>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        validate_api_key(config.api_key())?;

        let base_url = config.resolved_base_url();
        validate_url("base_url", &base_url)?;

        let api_version = config.api_version().trim_matches('/').to_string();
        if api_version.is_empty() {
            return Err(JewelMusicError::MissingConfigError {
                field: "api_version".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent().unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_version,
            api_key: config.api_key().to_string(),
            max_retries: config.max_retries(),
            retry_delay: config.retry_delay(),
            rate_limit: Mutex::new(RateLimitInfo::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<version>/<path>`, without doubling an existing version prefix.
    pub fn build_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let versioned = path == self.api_version || path.starts_with(&format!("{}/", self.api_version));
        if versioned {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/{}/{}", self.base_url, self.api_version, path)
        }
    }

    fn url_with_params(&self, path: &str, params: &Params) -> Result<Url> {
        let raw = self.build_url(path);
        let mut url = Url::parse(&raw).map_err(|e| JewelMusicError::InvalidConfigValueError {
            field: "path".to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Last rate-limit snapshot reported by the server.
    pub async fn rate_limit(&self) -> RateLimitInfo {
        self.rate_limit.lock().await.clone()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        self.request(Method::GET, path, params, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &Params::new(), Some(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::POST, path, &Params::new(), None).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, &Params::new(), Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, &Params::new(), None).await
    }

    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::DELETE, path, &Params::new(), Some(body)).await
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.url_with_params(path, params)?;
        let response = self
            .execute(&method, &url, |request| {
                Ok(match &body {
                    Some(body) => request.json(body),
                    None => request,
                })
            })
            .await?;
        self.decode(response).await
    }

    /// POST a multipart form: `fields` as text parts plus the file under `file`.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, file: &UploadFile, fields: &Params) -> Result<T> {
        let url = self.url_with_params(path, &Params::new())?;
        tracing::debug!(
            "Uploading {} ({} bytes) to {}",
            file.file_name,
            file.bytes.len(),
            path
        );

        let response = self
            .execute(&Method::POST, &url, |request| {
                let mut form = multipart::Form::new();
                for (key, value) in fields.iter() {
                    form = form.text(key.to_string(), value.to_string());
                }
                let part = multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(file.mime())?;
                Ok(request.multipart(form.part("file", part)))
            })
            .await?;
        self.decode(response).await
    }

    async fn execute<F>(&self, method: &Method, url: &Url, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.wait_for_rate_limit().await;

            let request = build(
                self.client
                    .request(method.clone(), url.clone())
                    .bearer_auth(&self.api_key)
                    .header(ACCEPT, "application/json"),
            )?;

            tracing::debug!("{} {} (attempt {})", method, url.path(), attempt + 1);

            match request.send().await {
                Ok(response) => {
                    self.record_rate_limit(response.headers()).await;
                    let status = response.status();
                    tracing::debug!("{} {} -> {}", method, url.path(), status.as_u16());

                    if status.is_success() {
                        return Ok(response);
                    }

                    if attempt < self.max_retries {
                        if let Some(delay) = self.retry_delay_for(status, response.headers(), attempt) {
                            tracing::warn!(
                                "{} {} returned {}, retrying in {:?} ({}/{})",
                                method,
                                url.path(),
                                status.as_u16(),
                                delay,
                                attempt + 1,
                                self.max_retries
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                    }

                    return Err(error_from_response(response).await);
                }
                Err(err) if err.is_connect() || err.is_timeout() => {
                    if attempt < self.max_retries {
                        let delay = self.backoff(attempt);
                        tracing::warn!(
                            "{} {} failed ({}), retrying in {:?} ({}/{})",
                            method,
                            url.path(),
                            err,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(JewelMusicError::Network {
                        message: format!("{} {} failed after {} attempts: {}", method, url.path(), attempt + 1, err),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    fn retry_delay_for(&self, status: StatusCode, headers: &HeaderMap, attempt: u32) -> Option<Duration> {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let from_header = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| Duration::from_secs_f64(secs).min(MAX_BACKOFF));
            return Some(from_header.unwrap_or_else(|| self.backoff(attempt)));
        }
        if status.is_server_error() {
            return Some(self.backoff(attempt));
        }
        None
    }

    async fn record_rate_limit(&self, headers: &HeaderMap) {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        }

        let limit = header::<u64>(headers, "X-RateLimit-Limit");
        let remaining = header::<u64>(headers, "X-RateLimit-Remaining");
        let reset = header::<i64>(headers, "X-RateLimit-Reset");

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return;
        }

        let mut state = self.rate_limit.lock().await;
        if limit.is_some() {
            state.limit = limit;
        }
        if remaining.is_some() {
            state.remaining = remaining;
        }
        if reset.is_some() {
            state.reset = reset;
        }
    }

    async fn wait_for_rate_limit(&self) {
        let wait = {
            let state = self.rate_limit.lock().await;
            match (state.remaining, state.reset) {
                (Some(remaining), Some(reset)) if remaining <= RATE_LIMIT_LOW_WATER => {
                    let now = chrono::Utc::now().timestamp();
                    (reset > now).then(|| Duration::from_secs((reset - now) as u64).min(MAX_BACKOFF))
                }
                _ => None,
            }
        };

        if let Some(wait) = wait {
            tracing::info!("Rate limit nearly exhausted, waiting {:?} for reset", wait);
            tokio::time::sleep(wait).await;
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        let body: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        let payload = match body {
            Value::Object(mut map) if map.contains_key("data") => {
                if let Some(meta) = map.get("meta").cloned() {
                    if let Ok(meta) = serde_json::from_value::<ResponseMeta>(meta) {
                        if let Some(request_id) = &meta.request_id {
                            tracing::debug!("request id {}", request_id);
                        }
                        if let Some(info) = meta.rate_limit {
                            let mut state = self.rate_limit.lock().await;
                            if state.remaining.is_none() {
                                *state = info;
                            }
                        }
                    }
                }
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        Ok(serde_json::from_value(payload)?)
    }
}

async fn error_from_response(response: Response) -> JewelMusicError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    };

    let error = JewelMusicError::from_response(status, &body, retry_after);
    tracing::debug!("API error: {}", error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client(base_url: &str) -> HttpClient {
        let mut config = ClientConfig::new("jml_test_key");
        config.base_url = Some(base_url.to_string());
        HttpClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_build_url_adds_version_once() {
        let http = client("https://api.example.com/");
        assert_eq!(http.build_url("/tracks"), "https://api.example.com/v1/tracks");
        assert_eq!(http.build_url("tracks/1"), "https://api.example.com/v1/tracks/1");
        assert_eq!(http.build_url("/v1/ping"), "https://api.example.com/v1/ping");
        assert_eq!(http.build_url("v10/x"), "https://api.example.com/v1/v10/x");
    }

    #[test]
    fn test_url_with_params_encodes_values() {
        let http = client("https://api.example.com");
        let mut params = Params::new();
        params.push("search", "a b&c");
        let url = http.url_with_params("/tracks", &params).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/tracks?search=a+b%26c");
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let http = client("https://api.example.com");
        assert_eq!(http.backoff(0), Duration::from_secs(1));
        assert_eq!(http.backoff(1), Duration::from_secs(2));
        assert_eq!(http.backoff(3), Duration::from_secs(8));
        assert_eq!(http.backoff(10), MAX_BACKOFF);
        assert_eq!(http.backoff(40), MAX_BACKOFF);
    }

    #[test]
    fn test_retry_delay_only_for_retryable_statuses() {
        let http = client("https://api.example.com");
        let mut headers = HeaderMap::new();
        assert_eq!(
            http.retry_delay_for(StatusCode::INTERNAL_SERVER_ERROR, &headers, 1),
            Some(Duration::from_secs(2))
        );
        assert_eq!(http.retry_delay_for(StatusCode::NOT_FOUND, &headers, 0), None);
        assert_eq!(http.retry_delay_for(StatusCode::BAD_REQUEST, &headers, 0), None);

        headers.insert(RETRY_AFTER, "120".parse().unwrap());
        assert_eq!(
            http.retry_delay_for(StatusCode::TOO_MANY_REQUESTS, &headers, 0),
            Some(MAX_BACKOFF)
        );
        headers.insert(RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(
            http.retry_delay_for(StatusCode::TOO_MANY_REQUESTS, &headers, 0),
            Some(Duration::from_secs(3))
        );
    }

    #[tokio::test]
    async fn test_rate_limit_headers_update_snapshot() {
        let http = client("https://api.example.com");
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Limit", "100".parse().unwrap());
        headers.insert("X-RateLimit-Remaining", "not-a-number".parse().unwrap());
        http.record_rate_limit(&headers).await;

        let snapshot = http.rate_limit().await;
        assert_eq!(snapshot.limit, Some(100));
        assert_eq!(snapshot.remaining, None);
    }

    #[test]
    fn test_from_config_rejects_bad_key() {
        let config = ClientConfig::new("bogus");
        assert!(HttpClient::from_config(&config).is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let http = client("https://api.example.com");
        assert!(!format!("{:?}", http).contains("jml_test_key"));
    }

    #[test]
    fn test_upload_file_mime() {
        let file = UploadFile::new("song.bin", vec![1, 2, 3]);
        assert_eq!(file.mime(), "application/octet-stream");
        assert_eq!(file.with_content_type("audio/mpeg").mime(), "audio/mpeg");
        assert_eq!(content_type_for_extension("MP3"), Some("audio/mpeg"));
    }

    #[tokio::test]
    async fn test_upload_file_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("demo.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "demo.wav");
        assert_eq!(file.mime(), "audio/wav");
        assert_eq!(file.bytes, b"RIFF");
    }
}
