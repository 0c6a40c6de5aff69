use crate::core::concurrent::poll_until;
use crate::core::http::HttpClient;
use crate::core::params::Params;
use crate::domain::model::{Generation, ListResponse};
use crate::resources::{list_params, require_id};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_fields;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// AI composition helpers. Every generate call returns a [`Generation`]
/// that finishes asynchronously; see [`Copilot::wait_for_generation`].
#[derive(Debug, Clone, Copy)]
pub struct Copilot<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyOptions {
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melody_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicing: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsOptions {
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhyme_scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllable_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspiration_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melody_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harmony_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_vocals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocal_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixing_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastering_preset: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTransferOptions {
    pub source_id: String,
    pub target_style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_structure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_timing: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl<'a> Copilot<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// `style` is required.
    pub async fn generate_melody(&self, options: &MelodyOptions) -> Result<Generation> {
        validate_required_fields(&serde_json::to_value(options)?, &["style"])?;
        self.http.post("/copilot/melody", options).await
    }

    pub async fn generate_harmony(&self, options: &HarmonyOptions) -> Result<Generation> {
        self.http.post("/copilot/harmony", options).await
    }

    /// `theme` is required.
    pub async fn generate_lyrics(&self, options: &LyricsOptions) -> Result<Generation> {
        validate_required_fields(&serde_json::to_value(options)?, &["theme"])?;
        self.http.post("/copilot/lyrics", options).await
    }

    pub async fn complete_song(&self, options: &SongOptions) -> Result<Generation> {
        self.http.post("/copilot/complete-song", options).await
    }

    pub async fn templates(&self, filter: Option<&TemplateFilter>) -> Result<Vec<Value>> {
        let params = Params::from_serializable(&filter)?;
        self.http.get("/copilot/templates", &params).await
    }

    pub async fn style_transfer(&self, options: &StyleTransferOptions) -> Result<Generation> {
        validate_required_fields(&serde_json::to_value(options)?, &["sourceId", "targetStyle"])?;
        self.http.post("/copilot/style-transfer", options).await
    }

    pub async fn get_generation(&self, generation_id: &str) -> Result<Generation> {
        let id = require_id("generation_id", generation_id)?;
        self.http
            .get(&format!("/copilot/generations/{}", id), &Params::new())
            .await
    }

    pub async fn list_generations(
        &self,
        page: u32,
        per_page: u32,
        filter: Option<&GenerationFilter>,
    ) -> Result<ListResponse<Generation>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/copilot/generations", &params).await
    }

    /// Poll a generation until it is completed, failed or cancelled.
    ///
    /// A failed generation is returned as `Ok`; check `status`.
    pub async fn wait_for_generation(
        &self,
        generation_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Generation> {
        let id = require_id("generation_id", generation_id)?;
        poll_until(
            &format!("generation {}", id),
            interval,
            timeout,
            || self.get_generation(id),
            Generation::is_finished,
        )
        .await
    }
}
