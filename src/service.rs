use crate::async_publisher::AsyncPublisher;
use crate::model::LogDetails;
use crate::sync_publisher::SyncPublisher;

/// Facade routing PDPO log entries to the configured delivery channels.
///
/// Which channels exist is a deployment-time choice; an unwired channel
/// reports delivery as not confirmed. There is no cross-channel fallback and
/// no retry logic here: all of that lives in the publishers.
pub struct LoggingService {
    async_publisher: Option<AsyncPublisher>,
    sync_publisher: Option<SyncPublisher>,
}

impl LoggingService {
    pub fn new(
        async_publisher: Option<AsyncPublisher>,
        sync_publisher: Option<SyncPublisher>,
    ) -> Self {
        Self {
            async_publisher,
            sync_publisher,
        }
    }

    /// Deliver via the queue channel.
    pub async fn personal_data_access_log_async(&self, details: &LogDetails) -> bool {
        match &self.async_publisher {
            Some(publisher) => publisher.publish(details).await,
            None => {
                tracing::warn!("Async PDPO channel is not configured, delivery not confirmed");
                false
            }
        }
    }

    /// Deliver via the direct HTTP channel.
    pub async fn personal_data_access_log_sync(&self, details: &LogDetails) -> bool {
        match &self.sync_publisher {
            Some(publisher) => publisher.publish(details).await,
            None => {
                tracing::warn!("Sync PDPO channel is not configured, delivery not confirmed");
                false
            }
        }
    }
}
