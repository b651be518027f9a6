use crate::config::AsyncChannelConfig;
use crate::error::AppError;
use crate::model::{Category, Envelope, LogDetails, ParticipantIdentifier};
use crate::queue::QueueTransport;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const NULL_SENTINEL: &str = "<null>";

/// Publishes PDPO log entries onto the logging service queue.
///
/// Every transport failure consumes one of the configured attempts; there is
/// no fail-fast classification on this channel because a queue send carries
/// no application-level rejection. Dropping the future returned by
/// [`publish`](Self::publish) cancels any in-flight pause and abandons the
/// remaining attempts.
pub struct AsyncPublisher {
    transport: Arc<dyn QueueTransport>,
    config: AsyncChannelConfig,
}

impl AsyncPublisher {
    pub fn new(transport: Arc<dyn QueueTransport>, config: AsyncChannelConfig) -> Self {
        Self { transport, config }
    }

    /// Enqueue one log entry, retrying up to `max_retries` times.
    ///
    /// Returns `true` on the first attempt that completes without error.
    /// Returns `false` after exhausting all attempts, having logged a
    /// redacted summary of the entry for operational diagnosis.
    pub async fn publish(&self, details: &LogDetails) -> bool {
        let body = match serde_json::to_string(&Envelope {
            log_type: &self.config.log_type,
            details,
        }) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(
                    business_identifier = %details.business_identifier,
                    error = %AppError::from(err),
                    "Unable to serialize PDPO log envelope"
                );
                return false;
            }
        };
        let properties = self.message_properties(details);

        for attempt in 1..=self.config.max_retries {
            match self
                .transport
                .send(&self.config.queue_name, &body, &properties)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        business_identifier = %details.business_identifier,
                        attempt,
                        max_retries = self.config.max_retries,
                        "Enqueued PDPO log"
                    );
                    return true;
                }
                Err(err) => {
                    tracing::warn!(
                        business_identifier = %details.business_identifier,
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %err,
                        "Failed to enqueue PDPO log"
                    );
                    if attempt < self.config.max_retries {
                        self.pause_between_attempts().await;
                    }
                }
            }
        }

        tracing::error!(
            business_identifier = %details.business_identifier,
            max_retries = self.config.max_retries,
            summary = %build_summary(&self.config.log_type, details),
            "Unable to enqueue PDPO log after exhausting all attempts"
        );
        false
    }

    /// Out-of-band routing properties stamped on the queue message:
    /// `logType` always, `createdByType` only when the creator carries a
    /// type tag.
    fn message_properties(&self, details: &LogDetails) -> HashMap<String, String> {
        let mut properties = HashMap::new();
        properties.insert("logType".to_string(), self.config.log_type.clone());
        if let Some(identifier_type) = &details.created_by.identifier_type {
            properties.insert(
                "createdByType".to_string(),
                identifier_type.as_str().to_string(),
            );
        }
        properties
    }

    async fn pause_between_attempts(&self) {
        if self.config.retry_delay_ms == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
    }
}

/// Redacted summary of a log entry for the exhaustion diagnostic.
///
/// Missing optional values appear as `"<null>"`; recipient fields appear only
/// for a `Disclosure` entry that names a recipient; `individuals` is always a
/// list, empty when there are none. The summary is surfaced to the log sink
/// only, never sent anywhere.
pub(crate) fn build_summary(log_type: &str, details: &LogDetails) -> serde_json::Value {
    let mut summary = serde_json::Map::new();
    summary.insert("logType".to_string(), json!(log_type));
    summary.insert(
        "businessIdentifier".to_string(),
        json!(details.business_identifier),
    );
    summary.insert(
        "createdByIdentifier".to_string(),
        json!(details.created_by.identifier),
    );
    summary.insert(
        "createdByIdentifierType".to_string(),
        json!(participant_type(&details.created_by)),
    );
    summary.insert("category".to_string(), json!(details.category.wire_value()));
    summary.insert(
        "createdAt".to_string(),
        json!(details.created_at.to_rfc3339()),
    );
    summary.insert(
        "ipAddress".to_string(),
        json!(details.ip_address.as_deref().unwrap_or(NULL_SENTINEL)),
    );

    if details.category == Category::Disclosure {
        if let Some(recipient) = &details.recipient {
            summary.insert(
                "recipientIdentifier".to_string(),
                json!(recipient.identifier),
            );
            summary.insert(
                "recipientIdentifierType".to_string(),
                json!(participant_type(recipient)),
            );
        }
    }

    let individuals: Vec<serde_json::Value> = details
        .individuals
        .iter()
        .map(|individual| {
            json!({
                "identifier": individual.identifier,
                "type": participant_type(individual),
            })
        })
        .collect();
    summary.insert("individuals".to_string(), json!(individuals));

    serde_json::Value::Object(summary)
}

fn participant_type(participant: &ParticipantIdentifier) -> String {
    participant
        .identifier_type
        .as_ref()
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| NULL_SENTINEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdentifierType;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` sends, then succeeds, recording every call.
    struct ScriptedTransport {
        failures: u32,
        calls: AtomicU32,
        recorded: Mutex<Vec<(String, String, HashMap<String, String>)>>,
    }

    impl ScriptedTransport {
        fn failing_first(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                recorded: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl QueueTransport for ScriptedTransport {
        async fn send(
            &self,
            destination: &str,
            body: &str,
            properties: &HashMap<String, String>,
        ) -> Result<(), AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.recorded.lock().unwrap().push((
                destination.to_string(),
                body.to_string(),
                properties.clone(),
            ));
            if call < self.failures {
                Err(AppError::Transport("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn sample_details() -> LogDetails {
        let offset = FixedOffset::east_opt(0).unwrap();
        LogDetails {
            created_by: ParticipantIdentifier::new("user-1", IdentifierType::OpalUserId),
            business_identifier: "case-42".to_string(),
            created_at: offset.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            ip_address: None,
            category: Category::Consultation,
            recipient: None,
            individuals: vec![],
        }
    }

    fn disclosure_details() -> LogDetails {
        LogDetails {
            category: Category::Disclosure,
            recipient: Some(ParticipantIdentifier::new(
                "service-7",
                IdentifierType::ExternalService,
            )),
            ..sample_details()
        }
    }

    fn publisher(transport: Arc<ScriptedTransport>, max_retries: u32) -> AsyncPublisher {
        let config: AsyncChannelConfig = serde_json::from_value(serde_json::json!({
            "connection_string":
                "Endpoint=sb://ns.example.net/;SharedAccessKeyName=K;SharedAccessKey=S",
            "queue_name": "pdpo-logs",
            "max_retries": max_retries,
            "retry_delay_ms": 0,
        }))
        .unwrap();
        AsyncPublisher::new(transport, config)
    }

    #[tokio::test]
    async fn test_publish_succeeds_on_first_attempt() {
        let transport = Arc::new(ScriptedTransport::failing_first(0));
        let publisher = publisher(transport.clone(), 3);

        assert!(publisher.publish(&sample_details()).await);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_stamps_routing_properties() {
        let transport = Arc::new(ScriptedTransport::failing_first(0));
        let publisher = publisher(transport.clone(), 3);

        publisher.publish(&sample_details()).await;

        let recorded = transport.recorded.lock().unwrap();
        let (destination, body, properties) = &recorded[0];
        assert_eq!(destination, "pdpo-logs");
        assert_eq!(properties.get("logType"), Some(&"PDPO".to_string()));
        assert_eq!(
            properties.get("createdByType"),
            Some(&"OPAL_USER_ID".to_string())
        );

        let envelope: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(envelope["log_type"], "PDPO");
        assert_eq!(envelope["details"]["business_identifier"], "case-42");
    }

    #[tokio::test]
    async fn test_publish_omits_created_by_type_property_when_untyped() {
        let transport = Arc::new(ScriptedTransport::failing_first(0));
        let publisher = publisher(transport.clone(), 3);

        let mut details = sample_details();
        details.created_by.identifier_type = None;
        publisher.publish(&details).await;

        let recorded = transport.recorded.lock().unwrap();
        let (_, _, properties) = &recorded[0];
        assert!(properties.contains_key("logType"));
        assert!(!properties.contains_key("createdByType"));
    }

    #[tokio::test]
    async fn test_publish_exhausts_all_attempts_on_transport_failure() {
        let transport = Arc::new(ScriptedTransport::failing_first(u32::MAX));
        let publisher = publisher(transport.clone(), 3);

        assert!(!publisher.publish(&sample_details()).await);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_publish_retries_then_succeeds() {
        let transport = Arc::new(ScriptedTransport::failing_first(2));
        let publisher = publisher(transport.clone(), 3);

        assert!(publisher.publish(&sample_details()).await);
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_summary_uses_null_sentinel_for_missing_values() {
        let mut details = sample_details();
        details.created_by.identifier_type = None;
        let summary = build_summary("PDPO", &details);

        assert_eq!(summary["logType"], "PDPO");
        assert_eq!(summary["businessIdentifier"], "case-42");
        assert_eq!(summary["createdByIdentifier"], "user-1");
        assert_eq!(summary["createdByIdentifierType"], "<null>");
        assert_eq!(summary["category"], "Consultation");
        assert_eq!(summary["ipAddress"], "<null>");
        assert_eq!(summary["individuals"], json!([]));
    }

    #[test]
    fn test_summary_includes_recipient_only_for_disclosure() {
        let summary = build_summary("PDPO", &disclosure_details());
        assert_eq!(summary["recipientIdentifier"], "service-7");
        assert_eq!(summary["recipientIdentifierType"], "EXTERNAL_SERVICE");

        // Same recipient, different category: fields must be absent
        let mut details = disclosure_details();
        details.category = Category::Consultation;
        let summary = build_summary("PDPO", &details);
        assert!(summary.get("recipientIdentifier").is_none());
        assert!(summary.get("recipientIdentifierType").is_none());
    }

    #[test]
    fn test_summary_omits_recipient_when_absent() {
        let mut details = disclosure_details();
        details.recipient = None;
        let summary = build_summary("PDPO", &details);
        assert!(summary.get("recipientIdentifier").is_none());
    }

    #[test]
    fn test_summary_lists_individuals_in_order() {
        let mut details = sample_details();
        details.individuals = vec![
            ParticipantIdentifier::new("a", IdentifierType::OpalUserId),
            ParticipantIdentifier {
                identifier: "b".to_string(),
                identifier_type: None,
            },
        ];
        let summary = build_summary("PDPO", &details);

        assert_eq!(summary["individuals"][0]["identifier"], "a");
        assert_eq!(summary["individuals"][0]["type"], "OPAL_USER_ID");
        assert_eq!(summary["individuals"][1]["identifier"], "b");
        assert_eq!(summary["individuals"][1]["type"], "<null>");
    }
}
