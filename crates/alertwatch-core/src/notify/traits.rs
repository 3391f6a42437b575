use async_trait::async_trait;

use crate::error::DeliveryError;

/// Outbound delivery capability.
///
/// Implementations post one text message to their configured target. A
/// failure is reported to the caller but never retried here.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Unique identifier (e.g. "discord", "log").
    fn name(&self) -> &str;

    /// Deliver `message` to the configured target.
    async fn dispatch(&self, message: &str) -> Result<(), DeliveryError>;
}
