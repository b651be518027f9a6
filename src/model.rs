use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag attached to a participant identifier.
///
/// The tag set is open: the two well-known tags get their own variants, and
/// anything else a caller supplies travels through `Other` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierType {
    OpalUserId,
    ExternalService,
    Other(String),
}

impl IdentifierType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpalUserId => "OPAL_USER_ID",
            Self::ExternalService => "EXTERNAL_SERVICE",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for IdentifierType {
    fn from(tag: &str) -> Self {
        match tag {
            "OPAL_USER_ID" => Self::OpalUserId,
            "EXTERNAL_SERVICE" => Self::ExternalService,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for IdentifierType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IdentifierType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(IdentifierType::from(tag.as_str()))
    }
}

/// A participant referenced by a PDPO log entry (the acting user, the
/// disclosure recipient, or an individual whose data was processed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentifier {
    pub identifier: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub identifier_type: Option<IdentifierType>,
}

impl ParticipantIdentifier {
    pub fn new(identifier: impl Into<String>, identifier_type: IdentifierType) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_type: Some(identifier_type),
        }
    }
}

/// Processing category of a PDPO log entry.
///
/// The wire strings are fixed by the remote logging service and differ from
/// the variant names; decoding anything outside the six canonical strings
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Collection")]
    Collection,
    #[serde(rename = "Alteration")]
    Alteration,
    #[serde(rename = "Consultation")]
    Consultation,
    #[serde(rename = "Disclosure")]
    Disclosure,
    #[serde(rename = "Combination")]
    Combination,
    #[serde(rename = "Erasure")]
    Erasure,
}

impl Category {
    /// Canonical wire string, as sent to the logging service.
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::Alteration => "Alteration",
            Self::Consultation => "Consultation",
            Self::Disclosure => "Disclosure",
            Self::Combination => "Combination",
            Self::Erasure => "Erasure",
        }
    }
}

/// Serde adapter for `created_at`: millisecond precision with a numeric
/// offset (`2024-05-01T12:30:00.123+01:00`), rendering a zero offset as `Z`.
mod offset_millis {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}

/// Personal data processing log entry, as handed over by the caller.
///
/// Publishers traverse this read-only; validation (e.g. a recipient being
/// present for `Disclosure`) is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDetails {
    #[serde(rename = "created_by")]
    pub created_by: ParticipantIdentifier,

    #[serde(rename = "business_identifier")]
    pub business_identifier: String,

    #[serde(rename = "created_at", with = "offset_millis")]
    pub created_at: DateTime<FixedOffset>,

    #[serde(rename = "ip_address", skip_serializing_if = "Option::is_none", default)]
    pub ip_address: Option<String>,

    pub category: Category,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recipient: Option<ParticipantIdentifier>,

    #[serde(default)]
    pub individuals: Vec<ParticipantIdentifier>,
}

/// Queue-only wrapper pairing the payload with a log-type tag so the
/// consumer can discriminate message schemas.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(rename = "log_type")]
    pub log_type: &'a str,
    pub details: &'a LogDetails,
}
