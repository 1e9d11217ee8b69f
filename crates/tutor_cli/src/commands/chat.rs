//! `tutor chat`: capture the file, then relay chat between a surface and the model.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tutor_capture::CaptureOutcome;
use tutor_core::conversation::BASE_TURNS;
use tutor_core::Role;
use tutor_runtime::activation::provider_from_config;
use tutor_runtime::{activate, Activation, ActivationRequest, ChatRelay, RuntimeConfig};

use crate::cli::SurfaceKind;
use crate::commands::prompt::describe_capture;
use crate::output;
use crate::surface::{terminal, ReplyTracker, SlashCommand, StdioFactory, TerminalFactory};

pub struct ChatArgs {
    pub file: Option<PathBuf>,
    pub surface: SurfaceKind,
    pub language: Option<String>,
    pub model: Option<String>,
    pub interpreter: Option<String>,
    pub echo: bool,
}

pub async fn handle(args: ChatArgs) -> Result<()> {
    // A missing credential stops here, before anything runs or opens.
    let mut config = RuntimeConfig::from_env()?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(interpreter) = args.interpreter {
        config = config.with_interpreter(interpreter);
    }
    let provider = provider_from_config(&config)?;

    let mut request = ActivationRequest::new(args.file.clone());
    if let Some(language) = args.language {
        request = request.with_language(language);
    }

    let spinner = match (&args.file, args.surface) {
        (Some(file), SurfaceKind::Terminal) => {
            Some(output::spinner(&format!("Running {}", file.display())))
        }
        _ => None,
    };
    let activation = activate(config, request, provider).await;
    if let Some(spinner) = &spinner {
        output::spinner_done(spinner);
    }
    let activation = activation?;

    if activation.session.is_none() {
        output::warning("No source file given; the tutor cannot answer until one is opened.");
    }
    if args.echo {
        echo_capture(&activation, args.surface);
    }

    match args.surface {
        SurfaceKind::Terminal => run_terminal(activation).await,
        SurfaceKind::Stdio => run_stdio(activation).await,
    }
}

/// Show the program output the way a visible run console would.
fn echo_capture(activation: &Activation, surface: SurfaceKind) {
    let Some(capture) = &activation.capture else {
        return;
    };

    if surface == SurfaceKind::Stdio {
        // stdout carries the protocol
        eprint!("{}", capture.text);
        return;
    }

    output::header("Program output");
    match &capture.outcome {
        CaptureOutcome::Completed { .. } if !capture.text.is_empty() => {
            print!("{}", capture.text);
            if !capture.text.ends_with('\n') {
                println!();
            }
        }
        _ => output::dim(&format!("({})", describe_capture(capture))),
    }
    println!();
}

async fn run_terminal(activation: Activation) -> Result<()> {
    let tracker = Arc::new(ReplyTracker::default());
    let factory = Arc::new(TerminalFactory::new(tracker.clone()));
    let mut relay = ChatRelay::new(activation.session, factory);
    relay.open().await?;
    terminal::prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            terminal::prompt();
            continue;
        }

        match SlashCommand::parse(line) {
            Some(SlashCommand::Quit) => break,
            Some(SlashCommand::Close) => {
                relay.on_close();
                tracker.reset();
                output::dim("Chat panel closed. /open to reopen, /quit to exit.");
                terminal::prompt();
            }
            Some(SlashCommand::Open) => relay.open().await?,
            Some(SlashCommand::History) => {
                print_history(&relay).await;
                terminal::prompt();
            }
            Some(SlashCommand::Unknown(command)) => {
                output::warning(&format!("Unknown command {}", command));
                terminal::prompt();
            }
            None if !relay.is_open() => {
                output::warning("Chat panel is closed. /open to reopen it.");
                terminal::prompt();
            }
            None => {
                tracker.sent();
                relay.on_user_message(line)?;
            }
        }
    }

    // Let queued turns finish before exiting.
    relay.shutdown().await;
    tracker.reset();
    Ok(())
}

async fn print_history(relay: &ChatRelay) {
    let Some(session) = relay.session() else {
        output::dim("(no chat session)");
        return;
    };

    let turns = session.transcript().await;
    let exchanges = &turns[BASE_TURNS.min(turns.len())..];
    if output::is_json() {
        output::data("history", &exchanges);
        return;
    }
    if exchanges.is_empty() {
        output::dim("(no messages yet)");
        return;
    }
    for turn in exchanges {
        let speaker = match turn.role() {
            Role::Human => style("You:").green().bold(),
            _ => style("Tutor:").magenta().bold(),
        };
        println!("{} {}", speaker, turn.text());
    }
}

async fn run_stdio(activation: Activation) -> Result<()> {
    let factory = Arc::new(StdioFactory::new(tokio::io::stdout()));
    let mut relay = ChatRelay::new(activation.session, factory);
    relay.open().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match crate::surface::stdio::decode_line(&line) {
            Ok(Some(message)) => relay.on_inbound(message)?,
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Ignoring malformed inbound message");
                output::warning(&format!("Ignoring malformed message: {}", e));
            }
        }
    }

    relay.shutdown().await;
    Ok(())
}
