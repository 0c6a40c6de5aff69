use anyhow::Result;
use async_trait::async_trait;
use jewelmusic::resources::Webhooks;
use jewelmusic::{
    check_signature, create_signature, events, verify_signature, Dispatch, JewelMusicError, SignatureError,
    WebhookEvent, WebhookHandler, WebhookRouter, WebhookVerifier,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

const SECRET: &str = "whsec_integration";

#[derive(Clone, Default)]
struct Inbox(Arc<Mutex<Vec<(String, String)>>>);

#[async_trait]
impl WebhookHandler for Inbox {
    async fn handle(&self, event: &WebhookEvent) -> jewelmusic::Result<()> {
        let track = event.data["trackId"].as_str().unwrap_or_default().to_string();
        self.0.lock().unwrap().push((event.kind.clone(), track));
        Ok(())
    }
}

struct Rejecting;

#[async_trait]
impl WebhookHandler for Rejecting {
    async fn handle(&self, _event: &WebhookEvent) -> jewelmusic::Result<()> {
        Err(JewelMusicError::ConfigError {
            message: "handler refused event".into(),
        })
    }
}

fn delivery(kind: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": "evt_1",
        "type": kind,
        "data": {"trackId": "trk_9"},
        "timestamp": "2024-05-01T12:00:00Z"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_signed_delivery_reaches_registered_handler() -> Result<()> {
    let inbox = Inbox::default();
    let router = WebhookRouter::new().on(events::TRACK_PROCESSED, inbox.clone());
    let verifier = WebhookVerifier::new(SECRET);

    let payload = delivery(events::TRACK_PROCESSED);
    let header = create_signature(&payload, SECRET, None);

    let (event, outcome) = router.handle_delivery(&verifier, &payload, &header).await?;

    assert_eq!(outcome, Dispatch::Handled);
    assert_eq!(event.id, "evt_1");
    assert_eq!(
        *inbox.0.lock().unwrap(),
        vec![(events::TRACK_PROCESSED.to_string(), "trk_9".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_tampered_delivery_never_reaches_handler() {
    let inbox = Inbox::default();
    let router = WebhookRouter::new().fallback(inbox.clone());
    let verifier = WebhookVerifier::new(SECRET);

    let payload = delivery(events::DISTRIBUTION_LIVE);
    let header = create_signature(&payload, SECRET, None);
    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");

    let err = router.handle_delivery(&verifier, &tampered, &header).await.unwrap_err();

    assert!(matches!(err, JewelMusicError::Signature(SignatureError::Mismatch)));
    assert!(inbox.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_event_goes_to_fallback_or_is_ignored() -> Result<()> {
    let verifier = WebhookVerifier::new(SECRET);
    let payload = delivery("playlist.created");
    let header = create_signature(&payload, SECRET, None);

    let bare = WebhookRouter::new().on(events::TRACK_UPLOADED, Inbox::default());
    let (_, outcome) = bare.handle_delivery(&verifier, &payload, &header).await?;
    assert_eq!(outcome, Dispatch::Ignored);

    let inbox = Inbox::default();
    let with_fallback = bare.fallback(inbox.clone());
    let (_, outcome) = with_fallback.handle_delivery(&verifier, &payload, &header).await?;
    assert_eq!(outcome, Dispatch::Fallback);
    assert_eq!(inbox.0.lock().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_handler_errors_propagate() {
    let router = WebhookRouter::new().on(events::ANALYSIS_COMPLETED, Rejecting);
    let verifier = WebhookVerifier::new(SECRET);
    let payload = delivery(events::ANALYSIS_COMPLETED);
    let header = create_signature(&payload, SECRET, None);

    let err = router.handle_delivery(&verifier, &payload, &header).await.unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: handler refused event");
}

#[test]
fn test_static_helpers_agree_with_free_functions() {
    let payload = br#"{"id":"evt_2","type":"webhook.test","data":{}}"#;
    let header = Webhooks::create_signature(payload, SECRET, Some(chrono::Utc::now().timestamp()));

    assert!(Webhooks::verify_signature(payload, &header, SECRET, 300));
    assert!(verify_signature(payload, &header, SECRET, 300));
    assert!(!verify_signature(payload, &header, "whsec_other", 300));

    let event = Webhooks::parse_event(payload).unwrap();
    assert_eq!(event.kind, events::WEBHOOK_TEST);
}

#[test]
fn test_stale_delivery_is_rejected_with_reason() {
    let payload = b"{}";
    let header = create_signature(payload, SECRET, Some(1_000));

    let err = check_signature(payload, &header, SECRET, 300, 2_000).unwrap_err();
    assert_eq!(
        err,
        SignatureError::OutsideTolerance {
            timestamp: 1_000,
            now: 2_000,
            tolerance: 300
        }
    );
    assert!(!verify_signature(payload, &header, SECRET, 300));
}

#[tokio::test]
async fn test_delivery_with_offsetless_timestamp_is_dispatched() -> Result<()> {
    let inbox = Inbox::default();
    let router = WebhookRouter::new().on(events::TRACK_UPLOADED, inbox.clone());
    let verifier = WebhookVerifier::new(SECRET);

    let payload =
        br#"{"id":"evt_1","type":"track.uploaded","data":{"trackId":"trk_3"},"timestamp":"2024-05-01T10:00:00.123456"}"#;
    let header = create_signature(payload, SECRET, None);

    let (event, outcome) = router.handle_delivery(&verifier, payload, &header).await?;

    assert_eq!(outcome, Dispatch::Handled);
    assert_eq!(event.timestamp.map(|ts| ts.timestamp()), Some(1_714_557_600));
    assert_eq!(inbox.0.lock().unwrap().len(), 1);
    Ok(())
}
