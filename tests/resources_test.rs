use anyhow::Result;
use httpmock::prelude::*;
use jewelmusic::resources::distribution::CreateRelease;
use jewelmusic::resources::webhooks::WebhookCreate;
use jewelmusic::{events, JewelMusic, JewelMusicError, ReleaseTrack, TrackMetadata, UploadFile};
use serde_json::json;
use std::time::Duration;

fn client(server: &MockServer) -> JewelMusic {
    JewelMusic::builder("jml_test_resources")
        .base_url(server.base_url())
        .max_retries(0)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_track_upload_is_multipart() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/tracks/upload")
                .header_exists("Content-Type")
                .body_contains("name=\"title\"")
                .body_contains("Midnight Run")
                .body_contains("name=\"tags\"")
                .body_contains("synth,night")
                .body_contains("filename=\"midnight.mp3\"")
                .body_contains("audio/mpeg");
            then.status(201).json_body(json!({
                "success": true,
                "data": {"id": "trk_42", "title": "Midnight Run", "artist": "Nia", "duration": 0, "status": "uploaded"}
            }));
        })
        .await;

    let mut metadata = TrackMetadata::new("Midnight Run", "Nia");
    metadata.tags = vec!["synth".into(), "night".into()];
    let file = UploadFile::new("midnight.mp3", b"ID3 fake audio".to_vec()).with_content_type("audio/mpeg");

    let track = client(&server).tracks().upload(&file, &metadata).await?;

    mock.assert_async().await;
    assert_eq!(track.id, "trk_42");
    assert_eq!(track.status, "uploaded");
    Ok(())
}

#[tokio::test]
async fn test_upload_from_disk_guesses_content_type() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("cover.png");
    std::fs::write(&path, b"PNG bytes")?;

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/tracks/trk_1/artwork")
                .body_contains("filename=\"cover.png\"")
                .body_contains("image/png");
            then.status(200).json_body(json!({"data": {"artworkUrl": "https://cdn.example/cover.png"}}));
        })
        .await;

    let artwork = UploadFile::from_path(&path).await?;
    let result = client(&server).tracks().upload_artwork("trk_1", &artwork).await?;

    mock.assert_async().await;
    assert_eq!(result["artworkUrl"], "https://cdn.example/cover.png");
    Ok(())
}

#[tokio::test]
async fn test_transcription_create_prefers_track_id() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transcription/create")
                .json_body(json!({"trackId": "trk_7", "languages": ["en"]}));
            then.status(200).json_body(json!({
                "data": {"id": "tr_1", "trackId": "trk_7", "status": "queued"}
            }));
        })
        .await;

    let options = jewelmusic::resources::transcription::TranscriptionOptions {
        languages: vec!["en".into()],
        ..Default::default()
    };
    let file = UploadFile::new("vocals.wav", b"RIFF".to_vec());
    let transcription = client(&server)
        .transcription()
        .create(Some("trk_7"), Some(&file), Some(&options))
        .await?;

    mock.assert_async().await;
    assert_eq!(transcription.status, "queued");
    Ok(())
}

#[tokio::test]
async fn test_create_release_posts_typed_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/distribution/releases")
                .json_body_partial(r#"{"type": "single", "title": "Glow", "releaseDate": "2025-03-01"}"#);
            then.status(201).json_body(json!({
                "data": {
                    "id": "rel_1", "type": "single", "title": "Glow", "artist": "Nia",
                    "status": "draft", "platforms": ["spotify"]
                }
            }));
        })
        .await;

    let release = CreateRelease {
        kind: "single".into(),
        title: "Glow".into(),
        artist: "Nia".into(),
        release_date: "2025-03-01".into(),
        tracks: vec![ReleaseTrack {
            track_id: "trk_1".into(),
            title: "Glow".into(),
            position: 1,
            ..Default::default()
        }],
        platforms: vec!["spotify".into()],
        ..Default::default()
    };
    let created = client(&server).distribution().create_release(&release).await?;

    mock.assert_async().await;
    assert_eq!(created.id, "rel_1");
    assert_eq!(created.platforms, vec!["spotify"]);
    Ok(())
}

#[tokio::test]
async fn test_webhook_test_defaults_event_type() -> Result<()> {
    let server = MockServer::start_async().await;
    let default_event = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/webhooks/wh_1/test")
                .json_body(json!({"eventType": "webhook.test"}));
            then.status(200).json_body(json!({"data": {"delivered": true}}));
        })
        .await;
    let explicit_event = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/webhooks/wh_1/test")
                .json_body(json!({"eventType": "track.uploaded"}));
            then.status(200).json_body(json!({"data": {"delivered": true}}));
        })
        .await;

    let client = client(&server);
    client.webhooks().test("wh_1", None).await?;
    client.webhooks().test("wh_1", Some(events::TRACK_UPLOADED)).await?;

    default_event.assert_async().await;
    explicit_event.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_webhook_create_and_event_types() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/webhooks")
                .json_body_partial(r#"{"url": "https://example.com/hooks", "events": ["track.processed"]}"#);
            then.status(201).json_body(json!({
                "data": {"id": "wh_9", "url": "https://example.com/hooks", "events": ["track.processed"], "active": true}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/webhooks/events/types");
            then.status(200).json_body(json!({"data": events::ALL}));
        })
        .await;

    let client = client(&server);
    let webhook = client
        .webhooks()
        .create(&WebhookCreate {
            url: "https://example.com/hooks".into(),
            events: vec![events::TRACK_PROCESSED.into()],
            ..Default::default()
        })
        .await?;
    assert!(webhook.active);

    let kinds = client.webhooks().event_types().await?;
    assert!(kinds.iter().any(|k| k == "distribution.live"));
    Ok(())
}

#[tokio::test]
async fn test_wait_for_generation_polls_until_finished() -> Result<()> {
    let server = MockServer::start_async().await;
    let mut pending = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/copilot/generations/gen_1");
            then.status(200)
                .json_body(json!({"data": {"id": "gen_1", "type": "melody", "status": "processing"}}));
        })
        .await;

    let client = client(&server);
    let copilot = client.copilot();
    let waiter = copilot.wait_for_generation("gen_1", Duration::from_millis(20), Duration::from_secs(5));

    let swap = async {
        tokio::time::sleep(Duration::from_millis(60)).await;
        let done = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/copilot/generations/gen_1");
                then.status(200).json_body(json!({
                    "data": {"id": "gen_1", "type": "melody", "status": "completed", "previewUrl": "https://cdn.example/gen_1.mp3"}
                }));
            })
            .await;
        pending.delete_async().await;
        done
    };

    let (generation, _) = tokio::join!(waiter, swap);
    let generation = generation?;
    assert_eq!(generation.status, "completed");
    assert_eq!(generation.preview_url.as_deref(), Some("https://cdn.example/gen_1.mp3"));
    Ok(())
}

#[tokio::test]
async fn test_wait_for_generation_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/copilot/generations/gen_slow");
            then.status(200)
                .json_body(json!({"data": {"id": "gen_slow", "type": "lyrics", "status": "processing"}}));
        })
        .await;

    let result = client(&server)
        .copilot()
        .wait_for_generation("gen_slow", Duration::from_millis(10), Duration::from_millis(50))
        .await;
    assert!(matches!(result, Err(JewelMusicError::Timeout { .. })));
}

#[tokio::test]
async fn test_fetch_tracks_concurrently() -> Result<()> {
    let server = MockServer::start_async().await;
    for id in ["trk_a", "trk_b", "trk_c"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/v1/tracks/{}", id));
                then.status(200).json_body(json!({
                    "data": {"id": id, "title": id.to_uppercase(), "artist": "Nia", "duration": 100, "status": "processed"}
                }));
            })
            .await;
    }

    let client = client(&server);
    let tracks = client.tracks();
    let results = jewelmusic::run_concurrently(2, ["trk_a", "trk_b", "trk_c"].map(|id| tracks.get(id))).await;

    let titles: Vec<String> = results.into_iter().map(|r| r.map(|t| t.title)).collect::<Result<_, _>>()?;
    assert_eq!(titles, vec!["TRK_A", "TRK_B", "TRK_C"]);
    Ok(())
}
