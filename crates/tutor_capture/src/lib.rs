//! Execution capture: run the learner's file once and collect its console text.

pub mod document;
pub mod error;
pub mod executor;

pub use document::{Document, detect_language};
pub use error::CaptureError;
pub use executor::{CaptureOutcome, CapturedOutput, ExecutionCapture, Interpreter};
