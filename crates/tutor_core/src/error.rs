use thiserror::Error;

use crate::turn::Role;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("conversation error: expected a {expected} turn, got {got}")]
    TurnOrder { expected: Role, got: Role },

    #[error("conversation error: {0}")]
    Conversation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
