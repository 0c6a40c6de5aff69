//! Webhook signature creation and verification.
//!
//! The service signs each delivery with HMAC-SHA256 over
//! `"<timestamp>.<raw body>"` and sends the result in the
//! `X-JewelMusic-Signature` header as `t=<unix seconds>,v1=<hex digest>`.

use crate::domain::model::WebhookEvent;
use crate::utils::error::{JewelMusicError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::str::FromStr;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-JewelMusic-Signature";

/// Seconds a signed timestamp may drift from the local clock.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,

    #[error("signature header has no v1 signature")]
    MissingSignature,

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("timestamp {timestamp} is outside the {tolerance}s tolerance (now {now})")]
    OutsideTolerance { timestamp: i64, now: i64, tolerance: u64 },

    #[error("signature does not match payload")]
    Mismatch,
}

/// Parsed `t=...,v1=...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> std::result::Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for element in header.split(',') {
            let Some((key, value)) = element.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    let ts = value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::InvalidTimestamp(value.to_string()))?;
                    timestamp = Some(ts);
                }
                "v1" if !value.is_empty() => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = match timestamp {
            Some(0) | None => return Err(SignatureError::MissingTimestamp),
            Some(ts) => ts,
        };
        if signatures.is_empty() {
            return Err(SignatureError::MissingSignature);
        }

        Ok(Self { timestamp, signatures })
    }
}

impl FromStr for SignatureHeader {
    type Err = SignatureError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn signing_mac(payload: &[u8], secret: &str, timestamp: i64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`.
pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    hex::encode(signing_mac(payload, secret, timestamp).finalize().into_bytes())
}

/// Build a signature header, as the service would, for tests and local tooling.
pub fn create_signature(payload: &[u8], secret: &str, timestamp: Option<i64>) -> String {
    let ts = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    format!("t={},v1={}", ts, compute_signature(payload, secret, ts))
}

/// 64 lowercase hex characters, the shape of a hex-encoded SHA-256 MAC.
fn is_hex_digest(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Verify a header against the payload at an explicit `now`, reporting why it failed.
pub fn check_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> std::result::Result<(), SignatureError> {
    let parsed = SignatureHeader::parse(header)?;

    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        return Err(SignatureError::OutsideTolerance {
            timestamp: parsed.timestamp,
            now,
            tolerance: tolerance_secs,
        });
    }

    let mut saw_valid_hex = false;
    for candidate in &parsed.signatures {
        // only the exact lowercase form the service emits is accepted
        if !is_hex_digest(candidate) {
            continue;
        }
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        saw_valid_hex = true;
        // verify_slice compares in constant time
        if signing_mac(payload, secret, parsed.timestamp)
            .verify_slice(&expected)
            .is_ok()
        {
            return Ok(());
        }
    }

    if saw_valid_hex {
        Err(SignatureError::Mismatch)
    } else {
        Err(SignatureError::InvalidHex)
    }
}

/// Verify a webhook signature header. Never panics; any malformed input is `false`.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, tolerance_secs: u64) -> bool {
    check_signature(payload, header, secret, tolerance_secs, chrono::Utc::now().timestamp()).is_ok()
}

pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent> {
    serde_json::from_slice(payload).map_err(JewelMusicError::from)
}

/// Holds the endpoint secret and verifies-then-parses incoming deliveries.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: u64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: u64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn verify(&self, payload: &[u8], header: &str) -> Result<()> {
        check_signature(
            payload,
            header,
            &self.secret,
            self.tolerance_secs,
            chrono::Utc::now().timestamp(),
        )?;
        Ok(())
    }

    pub fn verify_and_parse(&self, payload: &[u8], header: &str) -> Result<WebhookEvent> {
        self.verify(payload, header)?;
        parse_event(payload)
    }
}
