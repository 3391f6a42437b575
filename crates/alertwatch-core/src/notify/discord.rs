//! Discord delivery -- post alert messages via webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::traits::Notifier;
use crate::config::DiscordConfig;
use crate::error::DeliveryError;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

impl DiscordWebhook {
    /// Build from a full webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, DeliveryError> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(DeliveryError::NotConfigured);
        }
        let client = Client::builder().timeout(DELIVERY_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Build from the `[discord]` config section (`{api_base}/{id}/{token}`).
    pub fn from_config(config: &DiscordConfig) -> Result<Self, DeliveryError> {
        if !config.is_configured() {
            return Err(DeliveryError::NotConfigured);
        }
        Self::new(config.webhook_url())
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    fn name(&self) -> &str {
        "discord"
    }

    async fn dispatch(&self, message: &str) -> Result<(), DeliveryError> {
        let body = json!({ "content": message });

        let resp = self.client.post(&self.webhook_url).json(&body).send().await?;

        let status = resp.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "discord webhook accepted message");
            Ok(())
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}
