use crate::core::http::HttpClient;
use crate::core::params::Params;
use crate::domain::model::AnalyticsData;
use crate::resources::require_id;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_required_fields};
use serde::Serialize;
use serde_json::Value;

/// Streaming, audience and royalty reporting.
#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    http: &'a HttpClient,
}

/// Date range plus optional breakdowns shared by the reporting endpoints.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub territories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
}

impl AnalyticsQuery {
    pub fn between(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Default::default()
        }
    }

    fn to_params(&self) -> Result<Params> {
        validate_non_empty_string("startDate", &self.start_date)?;
        validate_non_empty_string("endDate", &self.end_date)?;
        Params::from_serializable(self)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyReportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueProjectionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_confidence_interval: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_recommendations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub query: AnalyticsQuery,
    /// `csv`, `xlsx`, `json` or `pdf`.
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_charts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub name: String,
    pub condition: AlertCondition,
    pub notifications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertCondition {
    pub metric: String,
    pub operator: String,
    pub threshold: f64,
    pub period: String,
}

impl<'a> Analytics<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn streams(&self, query: &AnalyticsQuery) -> Result<AnalyticsData> {
        self.http.get("/analytics/streams", &query.to_params()?).await
    }

    pub async fn listeners(&self, query: &AnalyticsQuery) -> Result<Value> {
        self.http.get("/analytics/listeners", &query.to_params()?).await
    }

    pub async fn platform_metrics(&self, query: &AnalyticsQuery) -> Result<Value> {
        self.http.get("/analytics/platform-metrics", &query.to_params()?).await
    }

    pub async fn geographical(&self, query: &AnalyticsQuery) -> Result<Value> {
        self.http.get("/analytics/geographical", &query.to_params()?).await
    }

    pub async fn trends(&self, query: &AnalyticsQuery) -> Result<Value> {
        self.http.get("/analytics/trends", &query.to_params()?).await
    }

    pub async fn royalty_reports(
        &self,
        start_date: &str,
        end_date: &str,
        options: Option<&RoyaltyReportOptions>,
    ) -> Result<Value> {
        validate_non_empty_string("startDate", start_date)?;
        validate_non_empty_string("endDate", end_date)?;
        let mut params = Params::new();
        params.push("startDate", start_date).push("endDate", end_date);
        params.merge(&options)?;
        self.http.get("/analytics/royalties/reports", &params).await
    }

    pub async fn download_royalty_statement(&self, report_id: &str, format: &str) -> Result<Value> {
        let id = require_id("report_id", report_id)?;
        let mut params = Params::new();
        params.push("format", format);
        self.http
            .get(&format!("/analytics/royalties/statements/{}", id), &params)
            .await
    }

    pub async fn revenue_projections(&self, options: Option<&RevenueProjectionOptions>) -> Result<Value> {
        let params = Params::from_serializable(&options)?;
        self.http.get("/analytics/royalties/projections", &params).await
    }

    pub async fn track_analytics(&self, track_id: &str, query: &AnalyticsQuery) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        self.http
            .get(&format!("/analytics/tracks/{}", id), &query.to_params()?)
            .await
    }

    pub async fn realtime(&self, options: Option<&RealtimeOptions>) -> Result<Value> {
        let params = Params::from_serializable(&options)?;
        self.http.get("/analytics/realtime", &params).await
    }

    pub async fn insights(&self, options: Option<&InsightsOptions>) -> Result<Value> {
        let params = Params::from_serializable(&options)?;
        self.http.get("/analytics/insights", &params).await
    }

    pub async fn export(&self, options: &ExportOptions) -> Result<Value> {
        validate_non_empty_string("format", &options.format)?;
        self.http.post("/analytics/export", options).await
    }

    pub async fn setup_alert(&self, alert: &AlertConfig) -> Result<Value> {
        validate_required_fields(&serde_json::to_value(alert)?, &["name"])?;
        validate_required_fields(&serde_json::to_value(&alert.condition)?, &["metric", "operator"])?;
        self.http.post("/analytics/alerts", alert).await
    }
}
