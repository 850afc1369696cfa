use std::time::Duration;

/// Error types for speech sessions
///
/// Every session call resolves to exactly one of these or to its success value;
/// nothing is retried inside the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeechError {
    /// A frame or header could not be parsed
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    /// The server answered with a non-success status or an error frame
    #[error("API error ({code}): {message}")]
    Api { code: i32, message: String },

    /// The connection could not be opened, or failed or closed mid-session
    #[error("Transport error: {0}")]
    Transport(String),

    /// No terminal event arrived before the session deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SpeechError {
    /// Build an API error from a server code and message.
    pub fn api(code: i32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Result type for speech operations
pub type SpeechResult<T> = Result<T, SpeechError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = SpeechError::api(1001, "busy");
        assert_eq!(err.to_string(), "API error (1001): busy");
        assert_eq!(
            err,
            SpeechError::Api {
                code: 1001,
                message: "busy".to_string()
            }
        );
    }

    #[test]
    fn test_timeout_flag() {
        assert!(SpeechError::Timeout(Duration::from_secs(20)).is_timeout());
        assert!(!SpeechError::Transport("reset".to_string()).is_timeout());
    }
}
