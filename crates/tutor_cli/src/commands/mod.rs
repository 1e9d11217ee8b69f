//! Command dispatch.

pub mod chat;
pub mod config;
pub mod prompt;

use crate::cli::{Cli, Command};
use anyhow::Result;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chat {
            file,
            surface,
            language,
            model,
            interpreter,
            no_echo,
        } => {
            chat::handle(chat::ChatArgs {
                file,
                surface,
                language,
                model,
                interpreter,
                echo: !no_echo,
            })
            .await
        }
        Command::Prompt {
            file,
            language,
            interpreter,
        } => prompt::handle(file, language, interpreter).await,
        Command::Config { action } => config::handle(action).await,
    }
}
