use crate::utils::error::{JewelMusicError, Result};
use serde::Serialize;
use serde_json::Value;

/// Ordered `key=value` pairs used both as query strings and as multipart text fields.
///
/// Option structs are flattened through serde: `None` is dropped, lists become
/// comma-joined strings, booleans render as `true`/`false`, nested objects are
/// sent as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paged(page: u32, per_page: u32) -> Self {
        let mut params = Self::new();
        params.push("page", page);
        params.push("perPage", per_page);
        params
    }

    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let mut params = Self::new();
        params.merge(value)?;
        Ok(params)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Flatten a serializable struct or map into this set. Later keys overwrite earlier ones.
    pub fn merge<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        match serde_json::to_value(value)? {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    if let Some(rendered) = render_value(&value) {
                        self.push(key, rendered);
                    }
                }
            }
            other => {
                return Err(JewelMusicError::Serialization(serde::ser::Error::custom(format!(
                    "parameters must serialize to an object, got {}",
                    other
                ))))
            }
        }
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_scalar)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(map) if map.is_empty() => None,
        Value::Object(_) => Some(value.to_string()),
        scalar => render_scalar(scalar),
    }
}
