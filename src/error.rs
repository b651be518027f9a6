use std::fmt;

/// Delivery subsystem error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error (missing or out-of-range option)
    ConfigError(String),
    /// Malformed queue connection string
    InvalidConnectionString(String),
    /// Transport-level failure (no usable response obtained)
    Transport(String),
    /// Payload serialization failure
    SerializationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InvalidConnectionString(msg) => {
                write!(f, "Invalid connection string: {}", msg)
            }
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_json_error_converts_to_serialization_error() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error = AppError::from(err);
        assert!(matches!(error, AppError::SerializationError(_)));
        assert!(error.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::InvalidConnectionString("missing Endpoint segment".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid connection string: missing Endpoint segment"
        );
    }
}
