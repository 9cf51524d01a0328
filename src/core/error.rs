use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the provider layer while talking to the remote model.
///
/// The relay never lets these escape. They are folded into a
/// [`CompletionResult::Failure`](super::types::CompletionResult) with the
/// `ProviderError` kind.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Request cancelled")]
    Cancelled,
}

impl LlmError {
    /// HTTP status returned by the provider, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = LlmError::Api {
            message: "quota exhausted".to_string(),
            status_code: Some(429),
            source: None,
        };
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.to_string(), "API error: quota exhausted");
    }

    #[test]
    fn timeout_message_names_duration() {
        let err = LlmError::Timeout {
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Request timed out after 5s");
        assert_eq!(err.status_code(), None);
    }
}
