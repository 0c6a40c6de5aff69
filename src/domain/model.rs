use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `meta` block of the response envelope `{success, data, meta, error}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub timestamp: Option<String>,
    pub request_id: Option<String>,
    pub rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Unix timestamp (seconds) when the window resets.
    pub reset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    pub timestamp: String,
    pub version: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.pagination.page < self.pagination.total_pages
    }
}

// Tracks

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub duration: u32,
    pub status: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, String>,
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }
}

// Analysis

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub track_id: Option<String>,
    pub status: String,
    pub tempo: Option<TempoAnalysis>,
    pub key: Option<KeyAnalysis>,
    pub structure: Option<StructureAnalysis>,
    pub quality: Option<QualityAnalysis>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoAnalysis {
    pub bpm: f64,
    pub confidence: f64,
    pub time_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyAnalysis {
    pub key: String,
    pub mode: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureAnalysis {
    #[serde(default)]
    pub sections: Vec<Section>,
    pub form: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub overall_score: f64,
    #[serde(default)]
    pub details: HashMap<String, f64>,
    #[serde(default)]
    pub issues: Vec<String>,
}

// Copilot

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default)]
    pub parameters: Value,
    pub result: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub preview_url: Option<String>,
    pub download_url: Option<String>,
}

impl Generation {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "cancelled")
    }
}

// Distribution

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub artist: String,
    pub release_date: Option<String>,
    pub status: String,
    #[serde(default)]
    pub tracks: Vec<ReleaseTrack>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub territories: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTrack {
    pub track_id: String,
    pub title: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    pub position: u32,
}

// Transcription

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub id: String,
    pub track_id: Option<String>,
    pub status: String,
    pub language: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub confidence: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub confidence: f64,
    pub speaker: Option<String>,
}

// User

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subscription: Option<Subscription>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: String,
    pub status: String,
    pub next_billing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub features: Vec<String>,
}

// Analytics

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub summary: AnalyticsSummary,
    #[serde(default)]
    pub data: Vec<AnalyticsPoint>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_streams: i64,
    pub total_listeners: i64,
    pub total_revenue: f64,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsPoint {
    pub date: String,
    #[serde(default)]
    pub metrics: HashMap<String, i64>,
    pub revenue: Option<f64>,
    pub platform: Option<String>,
}

// Webhooks

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    pub secret: Option<String>,
    #[serde(default)]
    pub active: bool,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An event delivered to a webhook endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    /// Accepts RFC 3339, offset-less ISO 8601 (read as UTC) or unix seconds.
    /// Anything else becomes `None` rather than failing the delivery.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(timestamp_from_value))
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs as i64))
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_deserializes_from_camel_case() {
        let track: Track = serde_json::from_value(json!({
            "id": "trk_1",
            "title": "Midnight",
            "artist": "Nia",
            "duration": 215,
            "status": "processed",
            "uploadedAt": "2024-05-01T10:00:00Z",
            "fileUrl": "https://cdn.example/trk_1.mp3"
        }))
        .unwrap();

        assert_eq!(track.duration, 215);
        assert_eq!(track.file_url.as_deref(), Some("https://cdn.example/trk_1.mp3"));
        assert!(track.uploaded_at.is_some());
        assert!(track.processed_at.is_none());
    }

    #[test]
    fn test_track_metadata_skips_empty_fields() {
        let value = serde_json::to_value(TrackMetadata::new("Song", "Artist")).unwrap();
        assert_eq!(value, json!({"title": "Song", "artist": "Artist"}));
    }

    #[test]
    fn test_list_response_pagination() {
        let list: ListResponse<Webhook> = serde_json::from_value(json!({
            "items": [{"id": "wh_1", "url": "https://example.com/hook", "events": ["track.uploaded"], "active": true}],
            "pagination": {"page": 1, "perPage": 20, "total": 21, "totalPages": 2}
        }))
        .unwrap();

        assert_eq!(list.items.len(), 1);
        assert!(list.has_next_page());
    }

    #[test]
    fn test_generation_finished_states() {
        let mut generation: Generation = serde_json::from_value(json!({
            "id": "gen_1", "type": "melody", "status": "processing"
        }))
        .unwrap();
        assert!(!generation.is_finished());
        generation.status = "completed".to_string();
        assert!(generation.is_finished());
    }

    #[test]
    fn test_webhook_event_timestamp_formats() {
        let parse = |timestamp: Value| -> WebhookEvent {
            serde_json::from_value(json!({"id": "evt_1", "type": "track.uploaded", "timestamp": timestamp})).unwrap()
        };
        let expected = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().with_timezone(&Utc);

        assert_eq!(parse(json!("2024-05-01T10:00:00Z")).timestamp, Some(expected));
        assert_eq!(parse(json!("2024-05-01T12:00:00+02:00")).timestamp, Some(expected));
        assert_eq!(parse(json!("2024-05-01T10:00:00")).timestamp, Some(expected));
        assert_eq!(parse(json!(1_714_557_600)).timestamp, Some(expected));

        let micros = parse(json!("2024-05-01T10:00:00.123456")).timestamp.unwrap();
        assert_eq!(micros.timestamp(), expected.timestamp());

        assert_eq!(parse(json!("yesterday")).timestamp, None);
        assert_eq!(parse(Value::Null).timestamp, None);

        let missing: WebhookEvent = serde_json::from_value(json!({"id": "evt_2", "type": "webhook.test"})).unwrap();
        assert_eq!(missing.timestamp, None);
    }
}
