use crate::core::http::HttpClient;
use crate::core::params::Params;
use crate::core::router::events;
use crate::core::signature;
use crate::domain::model::{ListResponse, Webhook, WebhookEvent};
use crate::resources::{list_params, require_id};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::validate_url;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Webhook endpoint management and delivery history.
///
/// Signature helpers are associated functions and need no client:
/// [`Webhooks::verify_signature`], [`Webhooks::create_signature`],
/// [`Webhooks::parse_event`].
#[derive(Debug, Clone, Copy)]
pub struct Webhooks<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCreate {
    pub url: String,
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
}

/// Server-side redelivery policy for a webhook endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_multiplier: u32,
    pub max_backoff_delay: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, page: u32, per_page: u32, filter: Option<&WebhookFilter>) -> Result<ListResponse<Webhook>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/webhooks", &params).await
    }

    pub async fn get(&self, webhook_id: &str) -> Result<Webhook> {
        let id = require_id("webhook_id", webhook_id)?;
        self.http.get(&format!("/webhooks/{}", id), &Params::new()).await
    }

    /// `url` and at least one event are required.
    pub async fn create(&self, webhook: &WebhookCreate) -> Result<Webhook> {
        if webhook.url.trim().is_empty() {
            return Err(JewelMusicError::missing_fields(["url"]));
        }
        validate_url("url", &webhook.url)?;
        if webhook.events.is_empty() {
            return Err(JewelMusicError::missing_fields(["events"]));
        }
        self.http.post("/webhooks", webhook).await
    }

    pub async fn update(&self, webhook_id: &str, updates: &WebhookUpdate) -> Result<Webhook> {
        let id = require_id("webhook_id", webhook_id)?;
        if let Some(url) = &updates.url {
            validate_url("url", url)?;
        }
        self.http.put(&format!("/webhooks/{}", id), updates).await
    }

    pub async fn delete(&self, webhook_id: &str) -> Result<Value> {
        let id = require_id("webhook_id", webhook_id)?;
        self.http.delete(&format!("/webhooks/{}", id)).await
    }

    /// Ask the service to send a test delivery; `event_type` defaults to `webhook.test`.
    pub async fn test(&self, webhook_id: &str, event_type: Option<&str>) -> Result<Value> {
        let id = require_id("webhook_id", webhook_id)?;
        let event_type = event_type
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .unwrap_or(events::WEBHOOK_TEST);
        self.http
            .post(&format!("/webhooks/{}/test", id), &json!({ "eventType": event_type }))
            .await
    }

    pub async fn deliveries(
        &self,
        webhook_id: &str,
        page: u32,
        per_page: u32,
        filter: Option<&DeliveryFilter>,
    ) -> Result<ListResponse<Value>> {
        let id = require_id("webhook_id", webhook_id)?;
        let params = list_params(page, per_page, filter)?;
        self.http.get(&format!("/webhooks/{}/deliveries", id), &params).await
    }

    pub async fn delivery(&self, webhook_id: &str, delivery_id: &str) -> Result<Value> {
        let id = require_id("webhook_id", webhook_id)?;
        let delivery = require_id("delivery_id", delivery_id)?;
        self.http
            .get(&format!("/webhooks/{}/deliveries/{}", id, delivery), &Params::new())
            .await
    }

    pub async fn retry_delivery(&self, webhook_id: &str, delivery_id: &str) -> Result<Value> {
        let id = require_id("webhook_id", webhook_id)?;
        let delivery = require_id("delivery_id", delivery_id)?;
        self.http
            .post_empty(&format!("/webhooks/{}/deliveries/{}/retry", id, delivery))
            .await
    }

    pub async fn event_types(&self) -> Result<Vec<String>> {
        self.http.get("/webhooks/events/types", &Params::new()).await
    }

    pub async fn statistics(&self, webhook_id: &str, options: Option<&StatisticsOptions>) -> Result<Value> {
        let id = require_id("webhook_id", webhook_id)?;
        let params = Params::from_serializable(&options)?;
        self.http.get(&format!("/webhooks/{}/statistics", id), &params).await
    }

    /// See [`signature::verify_signature`].
    pub fn verify_signature(payload: &[u8], header: &str, secret: &str, tolerance_secs: u64) -> bool {
        signature::verify_signature(payload, header, secret, tolerance_secs)
    }

    /// See [`signature::create_signature`].
    pub fn create_signature(payload: &[u8], secret: &str, timestamp: Option<i64>) -> String {
        signature::create_signature(payload, secret, timestamp)
    }

    pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent> {
        signature::parse_event(payload)
    }
}
