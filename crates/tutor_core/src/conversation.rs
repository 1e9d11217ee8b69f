//! Append-only conversation owned by a chat session.

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::turn::{Role, Turn};

/// Number of turns in the base prompt (system + human template).
pub const BASE_TURNS: usize = 2;

/// Ordered turns of one chat session.
///
/// Starts with the system turn and the human template turn; afterwards only
/// human/assistant exchanges are appended, strictly alternating. Only
/// `new` and `append_exchange` build one, so it is serialized for logs but
/// never read back.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(system: Turn, human: Turn) -> Result<Self> {
        if system.role() != Role::System {
            return Err(CoreError::TurnOrder {
                expected: Role::System,
                got: system.role(),
            });
        }
        if human.role() != Role::Human {
            return Err(CoreError::TurnOrder {
                expected: Role::Human,
                got: human.role(),
            });
        }
        Ok(Self {
            turns: vec![system, human],
        })
    }

    /// Role the next appended turn must have.
    fn expected_role(&self) -> Role {
        if self.exchanges().len() % 2 == 0 {
            Role::Human
        } else {
            Role::Assistant
        }
    }

    /// Append a completed human/assistant pair. Nothing is appended unless
    /// both turns fit.
    pub fn append_exchange(&mut self, human: Turn, assistant: Turn) -> Result<()> {
        if self.expected_role() != Role::Human {
            return Err(CoreError::Conversation(
                "previous exchange is incomplete".to_string(),
            ));
        }
        if human.role() != Role::Human || assistant.role() != Role::Assistant {
            return Err(CoreError::Conversation(format!(
                "exchange must be human then assistant, got {} then {}",
                human.role(),
                assistant.role()
            )));
        }
        self.turns.push(human);
        self.turns.push(assistant);
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn system(&self) -> &Turn {
        &self.turns[0]
    }

    pub fn template(&self) -> &Turn {
        &self.turns[1]
    }

    /// Turns appended after the base prompt.
    pub fn exchanges(&self) -> &[Turn] {
        &self.turns[BASE_TURNS..]
    }

    /// Transcript of the exchanges so far, one `Speaker: text` entry per turn.
    pub fn render_transcript(&self) -> String {
        self.exchanges()
            .iter()
            .map(render_turn)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub(crate) fn speaker(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::Human => "Student",
        Role::Assistant => "Tutor",
    }
}

fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", speaker(turn.role()), turn.text())
}

/// Render a pending student message the same way transcript entries are.
pub fn render_pending(text: &str) -> String {
    format!("{}: {}", speaker(Role::Human), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Conversation {
        Conversation::new(Turn::system("persona"), Turn::human("template")).unwrap()
    }

    #[test]
    fn test_new_requires_system_then_human() {
        assert!(Conversation::new(Turn::human("a"), Turn::human("b")).is_err());
        assert!(Conversation::new(Turn::system("a"), Turn::assistant("b")).is_err());

        let conversation = base();
        assert_eq!(conversation.len(), BASE_TURNS);
        assert!(conversation.exchanges().is_empty());
        assert_eq!(conversation.system().text(), "persona");
        assert_eq!(conversation.template().text(), "template");
    }

    #[test]
    fn test_append_exchange_keeps_alternation() {
        let mut conversation = base();
        assert_eq!(conversation.expected_role(), Role::Human);

        let err = conversation
            .append_exchange(Turn::assistant("too early"), Turn::human("q"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conversation(_)));
        assert!(conversation
            .append_exchange(Turn::human("why?"), Turn::system("again"))
            .is_err());
        assert_eq!(conversation.len(), BASE_TURNS);

        conversation
            .append_exchange(Turn::human("why?"), Turn::assistant("what do you think?"))
            .unwrap();
        assert_eq!(conversation.expected_role(), Role::Human);
        assert_eq!(conversation.len(), 4);

        let roles: Vec<Role> = conversation.turns().iter().map(Turn::role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::Human, Role::Human, Role::Assistant]
        );
    }

    #[test]
    fn test_append_exchange_is_all_or_nothing() {
        let mut conversation = base();
        assert!(conversation
            .append_exchange(Turn::assistant("x"), Turn::human("y"))
            .is_err());
        assert_eq!(conversation.len(), BASE_TURNS);

        conversation
            .append_exchange(Turn::human("q1"), Turn::assistant("a1"))
            .unwrap();
        assert!(conversation
            .append_exchange(Turn::human("q2"), Turn::human("a2"))
            .is_err());
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.exchanges()[1].text(), "a1");
    }

    #[test]
    fn test_render_transcript() {
        let mut conversation = base();
        assert_eq!(conversation.render_transcript(), "");

        conversation
            .append_exchange(Turn::human("why does it crash?"), Turn::assistant("What is 1/0?"))
            .unwrap();
        assert_eq!(
            conversation.render_transcript(),
            "Student: why does it crash?\n\nTutor: What is 1/0?"
        );
        assert_eq!(render_pending("ok"), "Student: ok");
    }
}
