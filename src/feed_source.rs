// Transport boundary: where the raw XML of each feed comes from

use crate::config::FeedConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// Error types for fetching and decoding a feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Fetch(String),

    #[error("API error: {status_code} - {message}")]
    Status { status_code: u16, message: String },

    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("No endpoint configured for the {0} feed")]
    MissingFeed(FeedKind),

    #[error("Client error: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    // Live occupancy per facility
    Lots,
    // Static district metadata per facility
    Meta,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Lots => write!(f, "lots"),
            FeedKind::Meta => write!(f, "meta"),
        }
    }
}

// Anything that can hand back the raw document of a feed
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn fetch(&self, kind: FeedKind) -> Result<String, FeedError>;
}

// Scheme the service expects in front of the API key
const AUTH_SCHEME: &str = "APPCODE";

pub struct HttpFeedSource {
    client: reqwest::Client,
    lots_url: String,
    meta_url: Option<String>,
}

impl HttpFeedSource {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let mut auth = HeaderValue::from_str(&format!("{} {}", AUTH_SCHEME, config.api_key))
            .map_err(|e| FeedError::Client(format!("invalid API key header: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self {
            client,
            lots_url: config.api_lots_url.clone(),
            meta_url: config.api_meta_url.clone(),
        })
    }

    fn url_for(&self, kind: FeedKind) -> Result<&str, FeedError> {
        match kind {
            FeedKind::Lots => Ok(self.lots_url.as_str()),
            FeedKind::Meta => self.meta_url.as_deref().ok_or(FeedError::MissingFeed(kind)),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, kind: FeedKind) -> Result<String, FeedError> {
        let url = self.url_for(kind)?;
        debug!("Fetching {} feed from {}", kind, url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Fetch(format!("{} feed: {}", kind, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status_code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        resp.text()
            .await
            .map_err(|e| FeedError::Fetch(format!("{} feed body: {}", kind, e)))
    }
}
