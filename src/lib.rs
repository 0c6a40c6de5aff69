//! Async Rust client for the JewelMusic API, plus webhook signature
//! verification that works without a client.

pub mod config;
pub mod core;
pub mod domain;
pub mod resources;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{toml_config::TomlConfig, ClientConfig};

pub use core::client::{JewelMusic, JewelMusicBuilder};
pub use core::concurrent::{poll_until, run_concurrently};
pub use core::http::UploadFile;
pub use core::router::{events, Dispatch, WebhookRouter};
pub use core::signature::{
    check_signature, create_signature, parse_event, verify_signature, SignatureError, WebhookVerifier,
    DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER,
};
pub use domain::model::*;
pub use domain::ports::{ConfigProvider, Environment, WebhookHandler};
pub use utils::error::{JewelMusicError, Result};
