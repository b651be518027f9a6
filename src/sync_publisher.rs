use crate::config::SyncChannelConfig;
use crate::error::AppError;
use crate::model::LogDetails;
use crate::retry::{classify, Disposition};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Publishes PDPO log entries to the logging service over direct HTTP.
///
/// Each attempt POSTs the entry and classifies the outcome: the expected
/// 201 Created succeeds immediately, retryable failures (5xx, 429, no
/// response) pause and consume an attempt, anything else is a remote
/// rejection and fails fast without consuming the remaining attempts.
pub struct SyncPublisher {
    client: Client,
    url: String,
    config: SyncChannelConfig,
}

enum AttemptOutcome {
    Success,
    Failure {
        status: Option<u16>,
        description: String,
    },
}

impl SyncPublisher {
    pub fn new(config: SyncChannelConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.read_timeout_seconds))
            .build()
            .map_err(|err| AppError::ConfigError(format!("unable to build HTTP client: {}", err)))?;
        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint
        );
        Ok(Self {
            client,
            url,
            config,
        })
    }

    /// Send one log entry, retrying up to `max_attempts` times.
    ///
    /// Returns `false` on a terminal rejection or once the attempts are
    /// exhausted; the last failure description is logged but never drives
    /// control flow.
    pub async fn publish(&self, details: &LogDetails) -> bool {
        let mut last_failure = String::new();

        for attempt in 1..=self.config.max_attempts {
            tracing::debug!(
                business_identifier = %details.business_identifier,
                attempt,
                max_attempts = self.config.max_attempts,
                "Sending PDPO log"
            );

            match self.attempt(details).await {
                AttemptOutcome::Success => {
                    tracing::info!(
                        business_identifier = %details.business_identifier,
                        attempt,
                        "Sent PDPO log"
                    );
                    return true;
                }
                AttemptOutcome::Failure {
                    status,
                    description,
                } => match classify(status) {
                    Disposition::Terminal => {
                        tracing::warn!(
                            business_identifier = %details.business_identifier,
                            attempt,
                            last_failure = %description,
                            "Non-retryable PDPO response"
                        );
                        return false;
                    }
                    Disposition::Retryable => {
                        tracing::warn!(
                            business_identifier = %details.business_identifier,
                            attempt,
                            max_attempts = self.config.max_attempts,
                            last_failure = %description,
                            "Retryable PDPO delivery failure"
                        );
                        last_failure = description;
                        if attempt < self.config.max_attempts {
                            self.pause_between_attempts().await;
                        }
                    }
                },
            }
        }

        tracing::error!(
            business_identifier = %details.business_identifier,
            max_attempts = self.config.max_attempts,
            last_failure = %last_failure,
            "Unable to send PDPO log after exhausting all attempts"
        );
        false
    }

    async fn attempt(&self, details: &LogDetails) -> AttemptOutcome {
        match self.client.post(&self.url).json(details).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::CREATED {
                    return AttemptOutcome::Success;
                }
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                let description = if body.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    format!("HTTP {}: {}", status.as_u16(), body)
                };
                AttemptOutcome::Failure {
                    status: Some(status.as_u16()),
                    description,
                }
            }
            Err(err) => AttemptOutcome::Failure {
                status: err.status().map(|status| status.as_u16()),
                description: describe_transport_error(&err),
            },
        }
    }

    async fn pause_between_attempts(&self) {
        if self.config.retry_delay_ms == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else {
        "request"
    };
    format!("{} error: {}", kind, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let config: SyncChannelConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://logging-service/",
            "endpoint": "/log/pdpo",
        }))
        .unwrap();

        let publisher = SyncPublisher::new(config).unwrap();
        assert_eq!(publisher.url, "https://logging-service/log/pdpo");
    }
}
