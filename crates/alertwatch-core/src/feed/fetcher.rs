//! Feed retrieval.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::codec::decode_snapshot;
use super::item::Snapshot;
use crate::config::FeedConfig;
use crate::error::{FetchError, Result};

/// Anything that can produce the current feed snapshot.
///
/// A failed fetch must not yield a partial snapshot: either the whole
/// payload decodes or the call errors.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;
}

/// Fetches the feed over HTTP with a bounded request timeout.
pub struct HttpFeedSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::from(err)
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Snapshot> {
        debug!(url = %self.url, "fetching feed");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(decode_snapshot(&body, Utc::now())?)
    }
}
