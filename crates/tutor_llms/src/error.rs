//! Provider error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider.
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Error::InvalidResponse(message.into())
    }

    pub fn api(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Credential rejected (401/403).
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let auth = Error::api("openai", 401, "Incorrect API key provided");
        assert!(auth.is_auth());
        assert!(!auth.is_rate_limited());
        assert_eq!(
            auth.to_string(),
            "openai API error 401: Incorrect API key provided"
        );

        let limited = Error::api("openai", 429, "Rate limit reached");
        assert!(limited.is_rate_limited());
        assert!(!Error::invalid_response("empty").is_auth());
    }
}
