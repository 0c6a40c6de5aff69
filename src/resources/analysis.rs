use crate::core::concurrent::poll_until;
use crate::core::http::{HttpClient, UploadFile};
use crate::core::params::Params;
use crate::domain::model::{Analysis as AnalysisResult, KeyAnalysis, ListResponse, QualityAnalysis, StructureAnalysis, TempoAnalysis};
use crate::resources::{list_params, require_id};
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Audio analysis: tempo, key, structure, quality and mastering advice.
#[derive(Debug, Clone, Copy)]
pub struct Analysis<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub analysis_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_report: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural_context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_loudness: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_clipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_phase_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_dynamic_range: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_loudness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_platform: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteringOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_presets: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl<'a> Analysis<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn upload_track(&self, file: &UploadFile, options: Option<&AnalysisOptions>) -> Result<AnalysisResult> {
        let fields = Params::from_serializable(&options)?;
        self.http.upload("/analysis/upload", file, &fields).await
    }

    pub async fn get(&self, analysis_id: &str) -> Result<AnalysisResult> {
        let id = require_id("analysis_id", analysis_id)?;
        self.http.get(&format!("/analysis/{}", id), &Params::new()).await
    }

    pub async fn quality_check(&self, file: &UploadFile, options: Option<&QualityCheckOptions>) -> Result<QualityAnalysis> {
        let fields = Params::from_serializable(&options)?;
        self.http.upload("/analysis/quality-check", file, &fields).await
    }

    pub async fn mastering_suggestions(&self, file: &UploadFile, options: Option<&MasteringOptions>) -> Result<Value> {
        let fields = Params::from_serializable(&options)?;
        self.http.upload("/analysis/mastering-suggestions", file, &fields).await
    }

    pub async fn detect_structure(&self, file: &UploadFile) -> Result<StructureAnalysis> {
        self.http.upload("/analysis/detect-structure", file, &Params::new()).await
    }

    pub async fn detect_key(&self, file: &UploadFile) -> Result<KeyAnalysis> {
        self.http.upload("/analysis/detect-key", file, &Params::new()).await
    }

    pub async fn analyze_tempo(&self, file: &UploadFile) -> Result<TempoAnalysis> {
        self.http.upload("/analysis/tempo", file, &Params::new()).await
    }

    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
        filter: Option<&AnalysisFilter>,
    ) -> Result<ListResponse<AnalysisResult>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/analysis", &params).await
    }

    /// Poll [`get`](Self::get) until the analysis is `completed` or `failed`.
    pub async fn wait_for_completion(
        &self,
        analysis_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<AnalysisResult> {
        let id = require_id("analysis_id", analysis_id)?;
        poll_until(
            &format!("analysis {}", id),
            interval,
            timeout,
            || self.get(id),
            |analysis| matches!(analysis.status.as_str(), "completed" | "failed"),
        )
        .await
    }
}
