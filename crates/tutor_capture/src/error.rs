use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to read document {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interpreter timed out after {0:?}")]
    Timeout(Duration),

    #[error("Interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error("Failed to spawn interpreter: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
