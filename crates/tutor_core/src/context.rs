use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Inputs captured once when a session starts.
///
/// Never refreshed: edits to the file after capture are not seen by the
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    persona: String,
    source_text: String,
    execution_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_path: Option<PathBuf>,
}

impl PromptContext {
    pub fn new(
        persona: impl Into<String>,
        source_text: impl Into<String>,
        execution_output: impl Into<String>,
    ) -> Self {
        Self {
            persona: persona.into(),
            source_text: source_text.into(),
            execution_output: execution_output.into(),
            source_path: None,
        }
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn execution_output(&self) -> &str {
        &self.execution_output
    }

    pub fn source_path(&self) -> Option<&PathBuf> {
        self.source_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_context_accessors() {
        let ctx = PromptContext::new("P", "def f(): return 1/0", "ZeroDivisionError")
            .with_source_path("/tmp/f.py");
        assert_eq!(ctx.persona(), "P");
        assert_eq!(ctx.source_text(), "def f(): return 1/0");
        assert_eq!(ctx.execution_output(), "ZeroDivisionError");
        assert_eq!(ctx.source_path(), Some(&PathBuf::from("/tmp/f.py")));
    }
}
