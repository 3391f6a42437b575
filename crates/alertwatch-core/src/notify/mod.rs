pub mod discord;
pub mod format;
pub mod traits;

pub use discord::DiscordWebhook;
pub use format::{AlertFormatter, RenderZone};
pub use traits::Notifier;

use async_trait::async_trait;
use tracing::info;

use crate::error::DeliveryError;

/// Dry-run sink: logs the message instead of delivering it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, message: &str) -> Result<(), DeliveryError> {
        info!(target: "alertwatch::dry_run", "{message}");
        Ok(())
    }
}
