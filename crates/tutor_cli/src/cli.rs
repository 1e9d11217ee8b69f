//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Socratic tutor for the file you are debugging
#[derive(Parser)]
#[command(name = "tutor", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

/// Where the chat panel lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SurfaceKind {
    /// Interactive panel in this terminal
    #[default]
    Terminal,
    /// JSON lines on stdin/stdout, for editor integrations
    Stdio,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the file once and open a tutoring chat about it
    Chat {
        /// Source file the learner is working on
        file: Option<PathBuf>,
        /// Chat surface to open
        #[arg(long, value_enum, default_value = "terminal")]
        surface: SurfaceKind,
        /// Language tag for the file (default: from the extension)
        #[arg(long)]
        language: Option<String>,
        /// Model to use. Uses TUTOR_MODEL env if not set.
        #[arg(long)]
        model: Option<String>,
        /// Interpreter used to run the file. Uses TUTOR_INTERPRETER env if not set.
        #[arg(long)]
        interpreter: Option<String>,
        /// Do not echo the program output before chatting
        #[arg(long)]
        no_echo: bool,
    },
    /// Run the file once and print the prompt the tutor starts from
    Prompt {
        /// Source file to capture
        file: PathBuf,
        /// Language tag for the file (default: from the extension)
        #[arg(long)]
        language: Option<String>,
        /// Interpreter used to run the file
        #[arg(long)]
        interpreter: Option<String>,
    },
    /// Configure tutor settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Store the OpenAI API key in ~/.tutor/env
    Api,
    /// Show the resolved configuration
    Show,
}
