use crate::core::signature::WebhookVerifier;
use crate::domain::model::WebhookEvent;
use crate::domain::ports::WebhookHandler;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Event types the service delivers.
pub mod events {
    pub const TRACK_UPLOADED: &str = "track.uploaded";
    pub const TRACK_PROCESSED: &str = "track.processed";
    pub const ANALYSIS_COMPLETED: &str = "analysis.completed";
    pub const TRANSCRIPTION_COMPLETED: &str = "transcription.completed";
    pub const DISTRIBUTION_LIVE: &str = "distribution.live";
    pub const COPILOT_GENERATION_COMPLETED: &str = "copilot.generation_completed";
    pub const WEBHOOK_TEST: &str = "webhook.test";

    pub const ALL: [&str; 7] = [
        TRACK_UPLOADED,
        TRACK_PROCESSED,
        ANALYSIS_COMPLETED,
        TRANSCRIPTION_COMPLETED,
        DISTRIBUTION_LIVE,
        COPILOT_GENERATION_COMPLETED,
        WEBHOOK_TEST,
    ];
}

/// What happened to an event passed to [`WebhookRouter::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Fallback,
    Ignored,
}

/// Dispatches verified events to handlers registered by event type.
///
/// Transport-agnostic: feed it the raw body and signature header from
/// whatever server receives the delivery.
#[derive(Default, Clone)]
pub struct WebhookRouter {
    handlers: HashMap<String, Arc<dyn WebhookHandler>>,
    fallback: Option<Arc<dyn WebhookHandler>>,
}

impl std::fmt::Debug for WebhookRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("WebhookRouter")
            .field("handlers", &kinds)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl WebhookRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one event type, replacing any earlier one.
    pub fn on<H>(mut self, event_type: impl Into<String>, handler: H) -> Self
    where
        H: WebhookHandler + 'static,
    {
        self.handlers.insert(event_type.into(), Arc::new(handler));
        self
    }

    /// Handler for event types with no specific registration.
    pub fn fallback<H>(mut self, handler: H) -> Self
    where
        H: WebhookHandler + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<Dispatch> {
        if let Some(handler) = self.handlers.get(&event.kind) {
            tracing::debug!("Dispatching webhook {} ({})", event.id, event.kind);
            handler.handle(event).await?;
            return Ok(Dispatch::Handled);
        }

        match &self.fallback {
            Some(handler) => {
                tracing::debug!("No handler for {}, using fallback", event.kind);
                handler.handle(event).await?;
                Ok(Dispatch::Fallback)
            }
            None => {
                tracing::warn!("Unhandled webhook event type: {} ({})", event.kind, event.id);
                Ok(Dispatch::Ignored)
            }
        }
    }

    /// Verify the signature, parse the body, then dispatch.
    pub async fn handle_delivery(
        &self,
        verifier: &WebhookVerifier,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(WebhookEvent, Dispatch)> {
        let event = verifier.verify_and_parse(payload, signature_header)?;
        let outcome = self.dispatch(&event).await?;
        Ok((event, outcome))
    }
}
