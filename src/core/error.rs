//! Shield error types

use thiserror::Error;

/// Errors that can occur while moderating
#[derive(Error, Debug)]
pub enum ShieldError {
    /// The remote platform refused a call
    #[error("API error {code}: {description}")]
    Api {
        /// Platform error code (0 when none was given)
        code: i64,
        /// Human-readable reason from the platform
        description: String,
    },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required environment variable is not set
    #[error("Environment variable {0} should be defined")]
    MissingEnv(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A probe query did not answer in time
    #[error("Timed out querying {0}")]
    Timeout(String),
}

impl ShieldError {
    /// Create an API error
    pub fn api(code: i64, description: impl Into<String>) -> Self {
        ShieldError::Api {
            code,
            description: description.into(),
        }
    }
}

/// Result type alias for shield operations
pub type ShieldResult<T> = Result<T, ShieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShieldError::api(400, "Bad Request: user not found");
        assert_eq!(err.to_string(), "API error 400: Bad Request: user not found");

        let err = ShieldError::MissingEnv("TELEGRAM_BOT_TOKEN".into());
        assert_eq!(
            err.to_string(),
            "Environment variable TELEGRAM_BOT_TOKEN should be defined"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ShieldError = io_err.into();
        assert!(matches!(err, ShieldError::Io(_)));
    }
}
