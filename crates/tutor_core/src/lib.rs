pub mod context;
pub mod conversation;
pub mod error;
pub mod event;
pub mod session;
pub mod turn;

pub use context::PromptContext;
pub use conversation::Conversation;
pub use error::{CoreError, Result};
pub use event::{InboundMessage, OutboundMessage};
pub use session::SessionId;
pub use turn::{Role, TokenUsage, Turn};
