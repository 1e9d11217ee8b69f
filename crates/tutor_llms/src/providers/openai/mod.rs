//! OpenAI provider module
//!
//! Implements the Provider trait for the Chat Completions API.
//! API docs: https://platform.openai.com/docs/api-reference/chat

mod convert;
mod provider;
mod types;

pub use provider::OpenAIProvider;
pub use types::{OpenAIConfig, OpenAIRequest, OpenAIResponse};
