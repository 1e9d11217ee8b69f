//! Interactive chat panel in the current terminal.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use console::style;
use indicatif::ProgressBar;
use tutor_core::OutboundMessage;
use tutor_runtime::{DisplaySurface, SurfaceFactory};

use crate::output;

/// Commands typed into the terminal panel instead of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Open,
    Close,
    History,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// `None` when the line is a chat message.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let name = line.strip_prefix('/')?;
        let name = name.split_whitespace().next().unwrap_or_default();
        Some(match name.to_lowercase().as_str() {
            "open" => SlashCommand::Open,
            "close" => SlashCommand::Close,
            "history" => SlashCommand::History,
            "quit" | "exit" => SlashCommand::Quit,
            _ => SlashCommand::Unknown(line.to_string()),
        })
    }
}

/// Tracks replies still pending and shows a spinner while any are.
#[derive(Default)]
pub struct ReplyTracker {
    outstanding: AtomicUsize,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ReplyTracker {
    pub fn sent(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let mut spinner = self.lock_spinner();
        if spinner.is_none() {
            *spinner = Some(output::spinner("Thinking..."));
        }
    }

    pub fn received(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_default();
        if previous <= 1 {
            self.stop_spinner();
        }
    }

    /// Forget pending replies (their surface is gone).
    pub fn reset(&self) {
        self.outstanding.store(0, Ordering::SeqCst);
        self.stop_spinner();
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn stop_spinner(&self) {
        if let Some(spinner) = self.lock_spinner().take() {
            output::spinner_done(&spinner);
        }
    }

    fn lock_spinner(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct TerminalSurface {
    tracker: Arc<ReplyTracker>,
}

#[async_trait]
impl DisplaySurface for TerminalSurface {
    async fn post(&self, message: OutboundMessage) -> tutor_runtime::Result<()> {
        self.tracker.received();
        if output::is_json() {
            output::data("message", &message);
        } else {
            match &message {
                OutboundMessage::Reply { text } => {
                    println!("{} {}", style("Tutor:").magenta().bold(), text);
                }
                OutboundMessage::Error { error } => output::error(error),
            }
        }
        if self.tracker.outstanding() == 0 {
            prompt();
        }
        Ok(())
    }

    async fn reveal(&self) -> tutor_runtime::Result<()> {
        output::dim("Chat panel is already open.");
        prompt();
        Ok(())
    }
}

pub struct TerminalFactory {
    tracker: Arc<ReplyTracker>,
}

impl TerminalFactory {
    pub fn new(tracker: Arc<ReplyTracker>) -> Self {
        Self { tracker }
    }
}

impl SurfaceFactory for TerminalFactory {
    fn create(&self) -> tutor_runtime::Result<Arc<dyn DisplaySurface>> {
        output::header("Tutor chat");
        output::dim("Ask about your code. Commands: /history /close /open /quit");
        Ok(Arc::new(TerminalSurface {
            tracker: self.tracker.clone(),
        }))
    }
}

/// Input marker for the next message.
pub fn prompt() {
    if output::is_json() {
        return;
    }
    print!("{} ", style(">").cyan().bold());
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_command_parse() {
        assert_eq!(SlashCommand::parse("/close"), Some(SlashCommand::Close));
        assert_eq!(SlashCommand::parse("  /Open "), Some(SlashCommand::Open));
        assert_eq!(SlashCommand::parse("/history"), Some(SlashCommand::History));
        assert_eq!(SlashCommand::parse("/exit"), Some(SlashCommand::Quit));
        assert_eq!(
            SlashCommand::parse("/frobnicate now"),
            Some(SlashCommand::Unknown("/frobnicate now".to_string()))
        );
        assert_eq!(SlashCommand::parse("why is x / 0 bad?"), None);
    }

    #[test]
    fn test_reply_tracker_counts() {
        let tracker = ReplyTracker::default();
        tracker.sent();
        tracker.sent();
        assert_eq!(tracker.outstanding(), 2);
        tracker.received();
        assert_eq!(tracker.outstanding(), 1);
        tracker.reset();
        assert_eq!(tracker.outstanding(), 0);
        tracker.received();
        assert_eq!(tracker.outstanding(), 0);
    }
}
