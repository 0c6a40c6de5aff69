//! Typed handles for each API area. All of them borrow the client's
//! [`HttpClient`](crate::core::http::HttpClient).

pub mod analysis;
pub mod analytics;
pub mod copilot;
pub mod distribution;
pub mod tracks;
pub mod transcription;
pub mod user;
pub mod webhooks;

pub use analysis::Analysis;
pub use analytics::Analytics;
pub use copilot::Copilot;
pub use distribution::Distribution;
pub use tracks::Tracks;
pub use transcription::Transcription;
pub use user::User;
pub use webhooks::Webhooks;

use crate::core::params::Params;
use crate::utils::error::Result;
use crate::utils::validation::validate_non_empty_string;
use serde::Serialize;
use serde_json::Value;

/// Fail locally before a request is built with an empty path segment.
pub(crate) fn require_id<'a>(field: &str, id: &'a str) -> Result<&'a str> {
    validate_non_empty_string(field, id)?;
    Ok(id.trim())
}

/// `page`/`perPage` plus an optional filter struct.
pub(crate) fn list_params<F: Serialize>(page: u32, per_page: u32, filter: Option<&F>) -> Result<Params> {
    let mut params = Params::paged(page.max(1), per_page.max(1));
    if let Some(filter) = filter {
        params.merge(filter)?;
    }
    Ok(params)
}

/// Shallow-merge the keys of `extra` into `target` when both are objects.
pub(crate) fn merge_object(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        target.extend(extra);
    }
}
