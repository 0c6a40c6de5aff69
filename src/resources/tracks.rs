use crate::core::http::{HttpClient, UploadFile};
use crate::core::params::Params;
use crate::domain::model::{ListResponse, Track, TrackMetadata};
use crate::resources::{list_params, merge_object, require_id};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::validate_required_fields;
use serde::Serialize;
use serde_json::{json, Value};

/// Track upload, metadata and catalogue management.
#[derive(Debug, Clone, Copy)]
pub struct Tracks<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateItem {
    pub id: String,
    pub metadata: TrackMetadata,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProcessOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub notify: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarTracksOptions {
    pub limit: u32,
    pub min_similarity: f64,
    pub same_artist: bool,
    pub same_genre: bool,
}

impl Default for SimilarTracksOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            min_similarity: 0.7,
            same_artist: false,
            same_genre: false,
        }
    }
}

impl<'a> Tracks<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Upload an audio file. `metadata.title` and `metadata.artist` are required.
    pub async fn upload(&self, file: &UploadFile, metadata: &TrackMetadata) -> Result<Track> {
        validate_required_fields(&serde_json::to_value(metadata)?, &["title", "artist"])?;
        let fields = Params::from_serializable(metadata)?;
        self.http.upload("/tracks/upload", file, &fields).await
    }

    pub async fn list(&self, page: u32, per_page: u32, filter: Option<&TrackFilter>) -> Result<ListResponse<Track>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/tracks", &params).await
    }

    pub async fn get(&self, track_id: &str) -> Result<Track> {
        let id = require_id("track_id", track_id)?;
        self.http.get(&format!("/tracks/{}", id), &Params::new()).await
    }

    pub async fn update(&self, track_id: &str, metadata: &TrackMetadata) -> Result<Track> {
        let id = require_id("track_id", track_id)?;
        self.http.put(&format!("/tracks/{}", id), metadata).await
    }

    pub async fn delete(&self, track_id: &str) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        self.http.delete(&format!("/tracks/{}", id)).await
    }

    pub async fn upload_artwork(&self, track_id: &str, artwork: &UploadFile) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        self.http
            .upload(&format!("/tracks/{}/artwork", id), artwork, &Params::new())
            .await
    }

    pub async fn batch_update_metadata(&self, updates: &[BatchUpdateItem]) -> Result<Value> {
        if updates.is_empty() {
            return Err(JewelMusicError::missing_fields(["updates"]));
        }
        self.http
            .post("/tracks/batch/metadata", &json!({ "updates": updates }))
            .await
    }

    pub async fn batch_process(&self, track_ids: &[String], options: Option<&BatchProcessOptions>) -> Result<Value> {
        if track_ids.is_empty() {
            return Err(JewelMusicError::missing_fields(["trackIds"]));
        }
        let mut body = json!({ "trackIds": track_ids });
        if let Some(options) = options {
            merge_object(&mut body, serde_json::to_value(options)?);
        }
        self.http.post("/tracks/batch/process", &body).await
    }

    pub async fn processing_status(&self, track_id: &str) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        self.http
            .get(&format!("/tracks/{}/processing-status", id), &Params::new())
            .await
    }

    pub async fn generate_waveform(&self, track_id: &str, options: &WaveformOptions) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        self.http.post(&format!("/tracks/{}/waveform", id), options).await
    }

    pub async fn download_url(&self, track_id: &str, format: Option<&str>, quality: Option<&str>) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        let mut params = Params::new();
        params.push_opt("format", format).push_opt("quality", quality);
        self.http.get(&format!("/tracks/{}/download", id), &params).await
    }

    pub async fn find_similar(&self, track_id: &str, options: &SimilarTracksOptions) -> Result<Value> {
        let id = require_id("track_id", track_id)?;
        let params = Params::from_serializable(options)?;
        self.http.get(&format!("/tracks/{}/similar", id), &params).await
    }
}
