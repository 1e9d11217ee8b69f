//! Runtime error types

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Required setting absent; nothing else may start.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// No document was available when the session was set up.
    #[error("No chat session: open a source file before chatting")]
    UninitializedSession,

    #[error("Model provider failed: {0}")]
    ProviderFailed(#[from] tutor_llms::Error),

    #[error("Model provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Conversation error: {0}")]
    Conversation(#[from] tutor_core::CoreError),

    #[error("Capture failed: {0}")]
    Capture(#[from] tutor_capture::CaptureError),

    #[error("Relay is shut down")]
    RelayClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Errors that end only the current turn; the session stays usable.
    pub fn is_turn_local(&self) -> bool {
        matches!(
            self,
            RuntimeError::ProviderFailed(_) | RuntimeError::Timeout(_)
        )
    }

    /// Text shown on the chat surface for a failed turn.
    pub fn user_message(&self) -> String {
        match self {
            RuntimeError::ProviderFailed(e) if e.is_auth() => format!(
                "The model provider rejected the API key; check OPENAI_API_KEY ({})",
                e
            ),
            RuntimeError::ProviderFailed(e) if e.is_rate_limited() => format!(
                "The model provider is rate limiting requests; try again shortly ({})",
                e
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
