//! Error types for the observability crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// Subscriber or exporter setup failed
    #[error("Failed to initialize observability: {0}")]
    InitFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
