//! tutor_llms: chat-completion provider SDK.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            Arc<dyn Provider>                 │
//! │                    │                         │
//! │          ┌─────────┴─────────┐               │
//! │          ▼                   ▼               │
//! │   ┌────────────┐      ┌────────────┐         │
//! │   │  OpenAI    │      │  (test     │         │
//! │   │  Provider  │      │   doubles) │         │
//! │   └────────────┘      └────────────┘         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! One request in, one text reply out. No streaming.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tutor_llms::providers::openai::OpenAIConfig;
//! use tutor_llms::{GenerateRequest, Message, OpenAIProvider, Provider};
//!
//! # async fn run() -> tutor_llms::Result<()> {
//! let provider = OpenAIProvider::new(OpenAIConfig::new("sk-..."))?;
//! let request = GenerateRequest::new("gpt-4", vec![Message::user("hello")]).temperature(0.0);
//! let response = provider.generate(request).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;


pub use error::{Error, Result};
pub use provider::Provider;

#[cfg(feature = "openai")]
pub use providers::OpenAIProvider;

pub use types::{GenerateRequest, GenerateResponse, Headers, Message, Role, Usage};
