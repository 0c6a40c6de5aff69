use crate::core::http::HttpClient;
use crate::core::params::Params;
use crate::domain::model::{ListResponse, Release, ReleaseTrack};
use crate::resources::{list_params, require_id};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_required_fields};
use serde::Serialize;
use serde_json::{json, Value};

/// Release creation and delivery to streaming platforms.
#[derive(Debug, Clone, Copy)]
pub struct Distribution<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelease {
    /// `single`, `ep` or `album`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub artist: String,
    pub release_date: String,
    pub tracks: Vec<ReleaseTrack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub territories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
}

impl CreateRelease {
    fn check(&self) -> Result<()> {
        validate_required_fields(&serde_json::to_value(self)?, &["type", "title", "artist", "releaseDate"])?;
        if self.tracks.is_empty() {
            return Err(JewelMusicError::missing_fields(["tracks"]));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOptions {
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_go: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakedownOptions {
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immediate: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl<'a> Distribution<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn create_release(&self, release: &CreateRelease) -> Result<Release> {
        release.check()?;
        self.http.post("/distribution/releases", release).await
    }

    pub async fn list_releases(
        &self,
        page: u32,
        per_page: u32,
        filter: Option<&ReleaseFilter>,
    ) -> Result<ListResponse<Release>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/distribution/releases", &params).await
    }

    pub async fn get_release(&self, release_id: &str) -> Result<Release> {
        let id = require_id("release_id", release_id)?;
        self.http
            .get(&format!("/distribution/releases/{}", id), &Params::new())
            .await
    }

    pub async fn update_release(&self, release_id: &str, updates: &Value) -> Result<Release> {
        let id = require_id("release_id", release_id)?;
        self.http.put(&format!("/distribution/releases/{}", id), updates).await
    }

    pub async fn cancel_release(&self, release_id: &str) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        self.http.delete(&format!("/distribution/releases/{}", id)).await
    }

    pub async fn submit_to_platforms(&self, release_id: &str, options: &SubmissionOptions) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        if options.platforms.is_empty() {
            return Err(JewelMusicError::missing_fields(["platforms"]));
        }
        self.http
            .post(&format!("/distribution/releases/{}/submit", id), options)
            .await
    }

    pub async fn status(&self, release_id: &str) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        self.http
            .get(&format!("/distribution/releases/{}/status", id), &Params::new())
            .await
    }

    pub async fn takedown(&self, release_id: &str, options: &TakedownOptions) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        if options.platforms.is_empty() {
            return Err(JewelMusicError::missing_fields(["platforms"]));
        }
        self.http
            .post(&format!("/distribution/releases/{}/takedown", id), options)
            .await
    }

    pub async fn supported_platforms(&self) -> Result<Vec<Value>> {
        self.http.get("/distribution/platforms", &Params::new()).await
    }

    /// Server-side dry run of [`create_release`](Self::create_release).
    pub async fn validate_release(&self, release: &CreateRelease) -> Result<Value> {
        self.http.post("/distribution/validate", release).await
    }

    pub async fn schedule_release(&self, release_id: &str, scheduled_date: &str) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        validate_non_empty_string("scheduled_date", scheduled_date)?;
        self.http
            .post(
                &format!("/distribution/releases/{}/schedule", id),
                &json!({ "scheduledDate": scheduled_date }),
            )
            .await
    }

    pub async fn generate_preview(&self, release_id: &str) -> Result<Value> {
        let id = require_id("release_id", release_id)?;
        self.http
            .post_empty(&format!("/distribution/releases/{}/preview", id))
            .await
    }
}
