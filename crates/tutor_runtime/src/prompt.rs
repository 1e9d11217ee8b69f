//! Fixed Socratic prompt assembly.

use serde::Serialize;
use tracing::warn;
use tutor_core::{Conversation, PromptContext, Turn};
use tutor_llms::Message;

/// Default system instruction.
pub const PERSONA: &str = "You are a tutor that always responds in the Socratic style. \
You *never* give the student the answer, but always try to ask just the right question \
to help them learn to think for themselves. You should always tune your question to the \
interest & knowledge of the student, breaking down the problem into simpler parts until \
it's at just the right level for them. Socratic utterances are utterances that guide the \
user and do not give them the solution directly.";

pub const DOCUMENT_PLACEHOLDER: &str = "{documentText}";
pub const OUTPUT_PLACEHOLDER: &str = "{terminalOutput}";
pub const CONVERSATION_PLACEHOLDER: &str = "{msg}";

/// Human turn template. `{msg}` stays in place until a request is rendered.
pub const HUMAN_TEMPLATE: &str = "From now on you will be talking to a student. The user is a student.\n\
\n\
## Buggy Code\n\
\n \
```py\n\
{documentText}\n\
```\n\
\n\
## Code Output\n\
\n\
```{terminalOutput}\n\
```\n\
\n\
\n\
## Conversation so far\n\
\n\
{msg}\n\
\n\
Respond to the user with a Socratic utterance that guides the user to discover and fix \
the bug or issue in their code. The user's buggy code is described in `## Buggy Code`. \
User code is written in markdown throughout the conversation. Assume that the user has run \
the test cases.";

const PLACEHOLDERS: [&str; 3] = [
    DOCUMENT_PLACEHOLDER,
    OUTPUT_PLACEHOLDER,
    CONVERSATION_PLACEHOLDER,
];

/// The (system, human-template) pair a session is built on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasePrompt {
    system: String,
    template: String,
}

/// Compose the base prompt from a captured context. Runs once per session.
///
/// Substitution is literal and first-occurrence only; source or output that
/// itself contains a placeholder token corrupts the template. That case is
/// logged, not prevented.
pub fn build_prompt(context: &PromptContext) -> BasePrompt {
    for (name, text) in [
        ("source", context.source_text()),
        ("output", context.execution_output()),
    ] {
        if let Some(token) = PLACEHOLDERS.iter().find(|p| text.contains(*p)) {
            warn!(input = name, token, "Captured text contains a template placeholder");
        }
    }

    let template = HUMAN_TEMPLATE
        .replacen(DOCUMENT_PLACEHOLDER, context.source_text(), 1)
        .replacen(OUTPUT_PLACEHOLDER, context.execution_output(), 1);

    BasePrompt {
        system: context.persona().to_string(),
        template,
    }
}

impl BasePrompt {
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Human template with source and output filled in, `{msg}` still open.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Messages for one request, with the conversation so far in the `{msg}` slot.
    pub fn render(&self, conversation_so_far: &str) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(
                self.template
                    .replacen(CONVERSATION_PLACEHOLDER, conversation_so_far, 1),
            ),
        ]
    }

    /// Start a conversation holding this prompt as its base turns.
    pub fn to_conversation(&self) -> tutor_core::Result<Conversation> {
        Conversation::new(
            Turn::system(self.system.clone()),
            Turn::human(self.template.clone()),
        )
    }
}
