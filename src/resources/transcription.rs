use crate::core::http::{HttpClient, UploadFile};
use crate::core::params::Params;
use crate::domain::model::{ListResponse, Transcription as TranscriptionResult};
use crate::resources::{list_params, merge_object, require_id};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::Serialize;
use serde_json::{json, Value};

/// Lyric transcription, translation and lyric tooling.
#[derive(Debug, Clone, Copy)]
pub struct Transcription<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_timestamps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_level_timestamps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_diarization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speakers: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_rhyme: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_meter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapt_culturally: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsEnhancementOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improve_meter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhance_rhyming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust_tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_style: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl<'a> Transcription<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Transcribe an existing track (JSON body) or an uploaded file (multipart).
    ///
    /// When both are given the track id wins.
    pub async fn create(
        &self,
        track_id: Option<&str>,
        file: Option<&UploadFile>,
        options: Option<&TranscriptionOptions>,
    ) -> Result<TranscriptionResult> {
        match (track_id.map(str::trim).filter(|id| !id.is_empty()), file) {
            (Some(track_id), _) => {
                let mut body = json!({ "trackId": track_id });
                if let Some(options) = options {
                    merge_object(&mut body, serde_json::to_value(options)?);
                }
                self.http.post("/transcription/create", &body).await
            }
            (None, Some(file)) => {
                let fields = Params::from_serializable(&options)?;
                self.http.upload("/transcription/create", file, &fields).await
            }
            (None, None) => Err(JewelMusicError::missing_fields(["trackId", "file"])),
        }
    }

    pub async fn get(&self, transcription_id: &str) -> Result<TranscriptionResult> {
        let id = require_id("transcription_id", transcription_id)?;
        self.http.get(&format!("/transcription/{}", id), &Params::new()).await
    }

    pub async fn status(&self, transcription_id: &str) -> Result<Value> {
        let id = require_id("transcription_id", transcription_id)?;
        self.http
            .get(&format!("/transcription/{}/status", id), &Params::new())
            .await
    }

    /// `format` is e.g. `txt`, `srt`, `lrc` or `json`.
    pub async fn download(&self, transcription_id: &str, format: &str) -> Result<Value> {
        let id = require_id("transcription_id", transcription_id)?;
        let mut params = Params::new();
        params.push("format", format);
        self.http
            .get(&format!("/transcription/{}/download", id), &params)
            .await
    }

    pub async fn translate(
        &self,
        transcription_id: &str,
        target_languages: &[String],
        options: Option<&TranslationOptions>,
    ) -> Result<Value> {
        let id = require_id("transcription_id", transcription_id)?;
        if target_languages.is_empty() {
            return Err(JewelMusicError::missing_fields(["targetLanguages"]));
        }
        let mut body = json!({ "targetLanguages": target_languages });
        if let Some(options) = options {
            merge_object(&mut body, serde_json::to_value(options)?);
        }
        self.http
            .post(&format!("/transcription/{}/translate", id), &body)
            .await
    }

    /// Align existing lyrics to an audio file.
    pub async fn sync_lyrics(&self, transcription_id: &str, audio: &UploadFile) -> Result<Value> {
        let id = require_id("transcription_id", transcription_id)?;
        self.http
            .upload(&format!("/transcription/{}/sync", id), audio, &Params::new())
            .await
    }

    pub async fn enhance_lyrics(&self, lyrics: &str, options: Option<&LyricsEnhancementOptions>) -> Result<Value> {
        validate_non_empty_string("lyrics", lyrics)?;
        let mut body = json!({ "lyrics": lyrics });
        if let Some(options) = options {
            merge_object(&mut body, serde_json::to_value(options)?);
        }
        self.http.post("/transcription/enhance-lyrics", &body).await
    }

    pub async fn check_rhyme_scheme(&self, lyrics: &str) -> Result<Value> {
        validate_non_empty_string("lyrics", lyrics)?;
        self.http
            .post("/transcription/check-rhyme-scheme", &json!({ "lyrics": lyrics }))
            .await
    }

    pub async fn analyze_sentiment(&self, lyrics: &str) -> Result<Value> {
        validate_non_empty_string("lyrics", lyrics)?;
        self.http
            .post("/transcription/analyze-sentiment", &json!({ "lyrics": lyrics }))
            .await
    }

    pub async fn check_language_quality(&self, lyrics: &str, language: &str) -> Result<Value> {
        validate_non_empty_string("lyrics", lyrics)?;
        validate_non_empty_string("language", language)?;
        self.http
            .post(
                "/transcription/check-language-quality",
                &json!({ "lyrics": lyrics, "language": language }),
            )
            .await
    }

    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
        filter: Option<&TranscriptionFilter>,
    ) -> Result<ListResponse<TranscriptionResult>> {
        let params = list_params(page, per_page, filter)?;
        self.http.get("/transcription", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::test_support::offline_client;

    #[tokio::test]
    async fn test_create_requires_track_or_file() {
        let client = offline_client();
        let err = client.transcription().create(None, None, None).await.unwrap_err();
        match err {
            JewelMusicError::MissingFields { fields } => assert_eq!(fields, vec!["trackId", "file"]),
            other => panic!("unexpected error: {:?}", other),
        }

        let blank = client.transcription().create(Some("  "), None, None).await;
        assert!(matches!(blank, Err(JewelMusicError::MissingFields { .. })));
    }

    #[tokio::test]
    async fn test_lyric_tools_reject_empty_input() {
        let client = offline_client();
        let transcription = client.transcription();

        assert!(transcription.enhance_lyrics("", None).await.is_err());
        assert!(transcription.check_rhyme_scheme(" \n").await.is_err());
        assert!(transcription.analyze_sentiment("").await.is_err());
        assert!(transcription.check_language_quality("la la", "").await.is_err());
        assert!(transcription.translate("tr_1", &[], None).await.is_err());
    }

    #[test]
    fn test_options_flatten_for_upload() {
        let options = TranscriptionOptions {
            languages: vec!["en".into(), "es".into()],
            max_speakers: Some(2),
            ..Default::default()
        };
        let fields = Params::from_serializable(&Some(&options)).unwrap();
        assert_eq!(fields.get("languages"), Some("en,es"));
        assert_eq!(fields.get("maxSpeakers"), Some("2"));
    }
}
