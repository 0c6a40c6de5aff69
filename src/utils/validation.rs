use crate::utils::error::{JewelMusicError, Result};
use serde_json::Value;
use url::Url;

/// Accepted API key prefixes, one per key type issued by the service.
pub const API_KEY_PREFIXES: [&str; 3] = ["jml_live_", "jml_test_", "jml_dev_"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(JewelMusicError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(JewelMusicError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(JewelMusicError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// The key itself is never echoed back in the error.
pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(JewelMusicError::MissingConfigError {
            field: "api_key".to_string(),
        });
    }

    if !API_KEY_PREFIXES.iter().any(|prefix| api_key.starts_with(prefix)) {
        return Err(JewelMusicError::InvalidConfigValueError {
            field: "api_key".to_string(),
            value: "<redacted>".to_string(),
            reason: format!("API key must start with one of: {}", API_KEY_PREFIXES.join(", ")),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(JewelMusicError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(JewelMusicError::missing_fields([field_name]));
    }
    Ok(())
}

/// Check that every name in `required` is present and non-null in a JSON object.
pub fn validate_required_fields(data: &Value, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| match data.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(JewelMusicError::missing_fields(missing))
    }
}
