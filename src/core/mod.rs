pub mod client;
pub mod concurrent;
pub mod http;
pub mod params;
pub mod router;
pub mod signature;

pub use crate::domain::ports::{ConfigProvider, WebhookHandler};
pub use crate::utils::error::Result;
