use std::future::Future;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::feed::FeedEnvelope;

/// Path of the feed endpoint below the configured base URL.
pub const FEED_PATH: &str = "/api/news";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Server { status: u16 },
    #[error("response is not valid JSON: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Server { status } => Some(*status),
            _ => None,
        }
    }
}

/// Anything that can produce a feed envelope on demand.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<FeedEnvelope, FetchError>> + Send;
}

pub struct FeedClient {
    client: Client,
    endpoint: String,
}

impl FeedClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), FEED_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<FeedEnvelope, FetchError> {
        info!("Fetching feed: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Feed endpoint answered {}", status);
            return Err(FetchError::Server {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        let envelope = FeedEnvelope::from_json(&value);
        if let Some(error) = &envelope.error {
            warn!("Backend reported a scrape failure: {}", error);
        }
        info!("Received {} news items", envelope.news.len());

        Ok(envelope)
    }
}
