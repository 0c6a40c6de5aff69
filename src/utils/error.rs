use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::core::signature::SignatureError;

/// Fields shared by every error the API itself reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiErrorInfo {
    pub message: String,
    pub code: Option<String>,
    pub status_code: Option<u16>,
    pub request_id: Option<String>,
    pub details: Value,
}

impl fmt::Display for ApiErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " | Request ID: {}", request_id)?;
        }
        if let Some(status) = self.status_code {
            write!(f, " | Status: {}", status)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum JewelMusicError {
    #[error("Validation error: {info}")]
    Validation {
        info: ApiErrorInfo,
        validation_errors: Value,
    },

    #[error("Authentication failed: {0}")]
    Authentication(ApiErrorInfo),

    #[error("Permission denied: {0}")]
    Authorization(ApiErrorInfo),

    #[error("Not found: {0}")]
    NotFound(ApiErrorInfo),

    /// `retry_after` is in seconds from now: the `Retry-After` header, or the
    /// distance to `reset` (a unix timestamp), never negative.
    #[error("Rate limit exceeded: {info}")]
    RateLimit {
        info: ApiErrorInfo,
        retry_after: Option<u64>,
        limit: Option<u64>,
        remaining: Option<u64>,
        reset: Option<i64>,
    },

    #[error("Server error: {0}")]
    Server(ApiErrorInfo),

    #[error("Unexpected API error: {0}")]
    Unknown(ApiErrorInfo),

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Webhook signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{operation} did not complete within {waited:?}")]
    Timeout { operation: String, waited: Duration },
}

pub type Result<T> = std::result::Result<T, JewelMusicError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Api,
    Auth,
    Network,
    Configuration,
    Data,
    Webhook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl JewelMusicError {
    /// Map a non-success response to the matching error variant.
    ///
    /// `body` is the parsed error envelope, or a synthesized one when the
    /// server did not return JSON. `retry_after_header` is the raw
    /// `Retry-After` value, which wins over the envelope's reset time.
    pub fn from_response(status: StatusCode, body: &Value, retry_after_header: Option<u64>) -> Self {
        let error = body.get("error");
        let meta = body.get("meta");

        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });

        let info = ApiErrorInfo {
            message,
            code: error
                .and_then(|e| e.get("code"))
                .and_then(Value::as_str)
                .map(str::to_string),
            status_code: Some(status.as_u16()),
            request_id: meta
                .and_then(|m| m.get("requestId"))
                .and_then(Value::as_str)
                .map(str::to_string),
            details: error
                .and_then(|e| e.get("details"))
                .cloned()
                .unwrap_or(Value::Null),
        };

        match status.as_u16() {
            400 => {
                let validation_errors = info.details.get("validation").cloned().unwrap_or(Value::Null);
                JewelMusicError::Validation {
                    info,
                    validation_errors,
                }
            }
            401 => JewelMusicError::Authentication(info),
            403 => JewelMusicError::Authorization(info),
            404 => JewelMusicError::NotFound(info),
            429 => {
                let rate_limit = meta.and_then(|m| m.get("rateLimit"));
                let field = |name: &str| rate_limit.and_then(|r| r.get(name)).and_then(Value::as_i64);
                let reset = field("reset");
                let until_reset = reset.map(|r| u64::try_from(r - chrono::Utc::now().timestamp()).unwrap_or(0));
                JewelMusicError::RateLimit {
                    info,
                    retry_after: retry_after_header.or(until_reset),
                    limit: field("limit").and_then(|v| u64::try_from(v).ok()),
                    remaining: field("remaining").and_then(|v| u64::try_from(v).ok()),
                    reset,
                }
            }
            500..=599 => JewelMusicError::Server(info),
            _ => JewelMusicError::Unknown(info),
        }
    }

    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JewelMusicError::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn api_info(&self) -> Option<&ApiErrorInfo> {
        match self {
            JewelMusicError::Validation { info, .. } | JewelMusicError::RateLimit { info, .. } => Some(info),
            JewelMusicError::Authentication(info)
            | JewelMusicError::Authorization(info)
            | JewelMusicError::NotFound(info)
            | JewelMusicError::Server(info)
            | JewelMusicError::Unknown(info) => Some(info),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            JewelMusicError::Http(e) => e.status().map(|s| s.as_u16()),
            other => other.api_info().and_then(|i| i.status_code),
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.api_info().and_then(|i| i.request_id.as_deref())
    }

    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            JewelMusicError::RateLimit { .. }
            | JewelMusicError::Server(_)
            | JewelMusicError::Network { .. }
            | JewelMusicError::Timeout { .. } => true,
            JewelMusicError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            JewelMusicError::Authentication(_) | JewelMusicError::Authorization(_) => ErrorCategory::Auth,
            JewelMusicError::Validation { .. }
            | JewelMusicError::NotFound(_)
            | JewelMusicError::RateLimit { .. }
            | JewelMusicError::Server(_)
            | JewelMusicError::Unknown(_) => ErrorCategory::Api,
            JewelMusicError::Network { .. } | JewelMusicError::Http(_) | JewelMusicError::Timeout { .. } => {
                ErrorCategory::Network
            }
            JewelMusicError::ConfigError { .. }
            | JewelMusicError::MissingConfigError { .. }
            | JewelMusicError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            JewelMusicError::Serialization(_) | JewelMusicError::Io(_) | JewelMusicError::MissingFields { .. } => {
                ErrorCategory::Data
            }
            JewelMusicError::Signature(_) => ErrorCategory::Webhook,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            JewelMusicError::RateLimit { .. } => ErrorSeverity::Low,
            JewelMusicError::Server(_)
            | JewelMusicError::Network { .. }
            | JewelMusicError::Http(_)
            | JewelMusicError::Timeout { .. } => ErrorSeverity::Medium,
            JewelMusicError::ConfigError { .. }
            | JewelMusicError::MissingConfigError { .. }
            | JewelMusicError::InvalidConfigValueError { .. }
            | JewelMusicError::Authentication(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            JewelMusicError::Authentication(_) => "Check that the API key is valid and has not expired",
            JewelMusicError::Authorization(_) => "The API key lacks the scope required for this operation",
            JewelMusicError::NotFound(_) => "Verify the resource id",
            JewelMusicError::Validation { .. } | JewelMusicError::MissingFields { .. } => {
                "Review the request parameters"
            }
            JewelMusicError::RateLimit { .. } => "Wait for the rate limit window to reset and retry",
            JewelMusicError::Server(_) | JewelMusicError::Unknown(_) => {
                "Retry later; include the request id when contacting support"
            }
            JewelMusicError::Network { .. } | JewelMusicError::Http(_) | JewelMusicError::Timeout { .. } => {
                "Check network connectivity and retry"
            }
            JewelMusicError::ConfigError { .. }
            | JewelMusicError::MissingConfigError { .. }
            | JewelMusicError::InvalidConfigValueError { .. } => "Fix the client configuration",
            JewelMusicError::Serialization(_) | JewelMusicError::Io(_) => "Inspect the payload or file being processed",
            JewelMusicError::Signature(_) => "Check the webhook secret and the server clock",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.api_info() {
            Some(info) => info.message.clone(),
            None => self.to_string(),
        }
    }
}
