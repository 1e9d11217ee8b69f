pub mod activation;
pub mod chat;
pub mod config;
pub mod error;
pub mod prompt;
pub mod relay;

#[cfg(test)]
mod tests;

pub use activation::{activate, activate_from_env, Activation, ActivationRequest};
pub use chat::ChatSession;
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use prompt::{build_prompt, BasePrompt, PERSONA};
pub use relay::{ChatRelay, DisplaySurface, SurfaceFactory};
