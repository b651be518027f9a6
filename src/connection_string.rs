use crate::error::AppError;
use url::Url;

/// Credentials extracted from a queue connection string.
///
/// Derived once at channel setup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub fully_qualified_namespace: String,
    pub shared_access_key_name: String,
    pub shared_access_key: String,
}

/// Parse a semicolon-delimited `key=value` connection string.
///
/// Pairs are trimmed, empty pairs (trailing or doubled separators) are
/// skipped, and each pair is split at the first `=` only so that secrets
/// containing `=` survive intact. Keys other than `Endpoint`,
/// `SharedAccessKeyName` and `SharedAccessKey` are ignored. The namespace is
/// the host of the `Endpoint` URI; scheme and path are discarded.
pub fn parse(connection_string: &str) -> Result<ConnectionDetails, AppError> {
    if connection_string.trim().is_empty() {
        return Err(AppError::InvalidConnectionString(
            "connection string must not be blank".to_string(),
        ));
    }

    let mut endpoint = None;
    let mut key_name = None;
    let mut key = None;

    for pair in connection_string.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name, value),
            None => (pair, ""),
        };
        match name {
            "Endpoint" => endpoint = Some(value),
            "SharedAccessKeyName" => key_name = Some(value),
            "SharedAccessKey" => key = Some(value),
            _ => {}
        }
    }

    let endpoint = require_segment(endpoint, "Endpoint")?;
    let namespace = extract_host(endpoint)?;
    let key_name = require_segment(key_name, "SharedAccessKeyName")?;
    let key = require_segment(key, "SharedAccessKey")?;

    Ok(ConnectionDetails {
        fully_qualified_namespace: namespace,
        shared_access_key_name: key_name.to_string(),
        shared_access_key: key.to_string(),
    })
}

fn require_segment<'a>(value: Option<&'a str>, segment: &str) -> Result<&'a str, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::InvalidConnectionString(format!(
            "missing {} segment",
            segment
        ))),
    }
}

fn extract_host(endpoint: &str) -> Result<String, AppError> {
    let parsed = Url::parse(endpoint).map_err(|err| {
        AppError::InvalidConnectionString(format!("malformed Endpoint URI: {}", err))
    })?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(AppError::InvalidConnectionString(
            "Endpoint segment missing host".to_string(),
        )),
    }
}
