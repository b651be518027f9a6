use crate::config::AsyncChannelConfig;
use crate::connection_string::{self, ConnectionDetails};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Queue send capability consumed by the async publisher.
///
/// Implementations wrap whatever AMQP client the deployment uses; the
/// publisher only needs "send this JSON body with these string properties to
/// this destination, or fail". One long-lived handle is created at channel
/// setup and reused across publish calls.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        properties: &HashMap<String, String>,
    ) -> Result<(), AppError>;
}

/// Remote address and credentials for the queue channel, derived once from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEndpoint {
    pub remote_uri: String,
    pub username: String,
    pub password: String,
}

impl QueueEndpoint {
    /// Derive the broker URI and credentials from the channel configuration.
    ///
    /// A malformed connection string aborts channel construction here, before
    /// any transport handle exists.
    pub fn from_config(config: &AsyncChannelConfig) -> Result<Self, AppError> {
        let details = connection_string::parse(&config.connection_string)?;
        Ok(Self::new(&details, &config.protocol, config.send_timeout_seconds))
    }

    fn new(details: &ConnectionDetails, protocol: &str, send_timeout_seconds: u64) -> Self {
        let remote_uri = format!(
            "{}://{}?jms.sendTimeout={}&amqp.idleTimeout=120000",
            protocol,
            details.fully_qualified_namespace,
            send_timeout_seconds * 1_000
        );
        Self {
            remote_uri,
            username: details.shared_access_key_name.clone(),
            password: details.shared_access_key.clone(),
        }
    }
}
