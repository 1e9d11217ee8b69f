//! Display surfaces the relay can post to.

pub mod stdio;
pub mod terminal;

pub use stdio::StdioFactory;
pub use terminal::{ReplyTracker, SlashCommand, TerminalFactory};
