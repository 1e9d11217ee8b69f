use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::CaptureError;

/// Interpreter used to run documents of one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpreter {
    pub program: String,
    pub language_id: String,
}

impl Interpreter {
    pub fn new(program: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language_id: language_id.into().to_lowercase(),
        }
    }

    pub fn python() -> Self {
        Self::new("python", "python")
    }

    pub fn supports(&self, document: &Document) -> bool {
        document.language_id() == Some(self.language_id.as_str())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::python()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureOutcome {
    /// The interpreter ran to completion (any exit status).
    Completed { exit_code: Option<i32> },
    /// Document language does not match the interpreter; nothing ran.
    Skipped { language_id: Option<String> },
    /// The interpreter could not run or was stopped.
    Failed { reason: String },
}

/// Console text from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedOutput {
    pub text: String,
    pub outcome: CaptureOutcome,
    pub duration_ms: u64,
}

impl CapturedOutput {
    fn empty(outcome: CaptureOutcome) -> Self {
        Self {
            text: String::new(),
            outcome,
            duration_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Runs a document once with its interpreter and captures stdout + stderr.
#[derive(Debug, Clone, Default)]
pub struct ExecutionCapture {
    interpreter: Interpreter,
    timeout: Option<Duration>,
}

impl ExecutionCapture {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Never fails: unsupported documents and interpreter failures yield empty
    /// output so the caller can still build a prompt.
    pub async fn capture(&self, document: &Document) -> CapturedOutput {
        if !self.interpreter.supports(document) {
            info!(
                path = %document.path().display(),
                language = ?document.language_id(),
                interpreter = %self.interpreter.program,
                "Document language not supported, skipping execution"
            );
            return CapturedOutput::empty(CaptureOutcome::Skipped {
                language_id: document.language_id().map(str::to_string),
            });
        }

        match self.run(document).await {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    path = %document.path().display(),
                    error = %e,
                    "Execution capture failed, continuing with empty output"
                );
                CapturedOutput::empty(CaptureOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run the interpreter, surfacing spawn and timeout errors.
    pub async fn run(&self, document: &Document) -> Result<CapturedOutput, CaptureError> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.interpreter.program);
        cmd.kill_on_drop(true);

        // Run from the file's directory; the argument must then be relative to it.
        let path = document.path();
        match (path.parent().filter(|p| !p.as_os_str().is_empty()), path.file_name()) {
            (Some(dir), Some(name)) => {
                cmd.current_dir(dir).arg(name);
            }
            _ => {
                cmd.arg(path);
            }
        }

        debug!(
            program = %self.interpreter.program,
            path = %document.path().display(),
            "Running document"
        );

        let pending = cmd.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| CaptureError::Timeout(limit))?,
            None => pending.await,
        }
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CaptureError::InterpreterNotFound(self.interpreter.program.clone())
            }
            _ => CaptureError::SpawnFailed(e.to_string()),
        })?;

        let text = combine_streams(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        );
        let exit_code = output.status.code();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            exit_code = ?exit_code,
            bytes = text.len(),
            duration_ms,
            "Execution captured"
        );

        Ok(CapturedOutput {
            text,
            outcome: CaptureOutcome::Completed { exit_code },
            duration_ms,
        })
    }
}

/// Stdout first, then stderr, separated by a newline when needed.
fn combine_streams(stdout: &str, stderr: &str) -> String {
    let mut text = stdout.to_string();
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(stderr);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_combine_streams() {
        assert_eq!(combine_streams("", ""), "");
        assert_eq!(combine_streams("out\n", ""), "out\n");
        assert_eq!(combine_streams("", "err"), "err");
        assert_eq!(combine_streams("out", "err"), "out\nerr");
        assert_eq!(combine_streams("out\n", "err\n"), "out\nerr\n");
    }

    #[test]
    fn test_interpreter_supports() {
        let python = Interpreter::python();
        assert!(python.supports(&Document::new("a.py", "")));
        assert!(!python.supports(&Document::new("a.js", "")));
        assert!(!python.supports(&Document::new("README", "")));
    }

    #[tokio::test]
    async fn test_capture_skips_unsupported_language() {
        let capture = ExecutionCapture::default();
        let output = capture.capture(&Document::new("main.js", "console.log(1)")).await;

        assert!(output.is_empty());
        assert_eq!(
            output.outcome,
            CaptureOutcome::Skipped {
                language_id: Some("javascript".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_capture_missing_interpreter_yields_empty() {
        let capture = ExecutionCapture::new(Interpreter::new(
            "tutor-no-such-interpreter",
            "python",
        ));
        let output = capture.capture(&Document::new("main.py", "print(1)")).await;

        assert!(output.is_empty());
        assert!(matches!(output.outcome, CaptureOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_collects_stdout_and_stderr() {
        let mut file = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        writeln!(file, "echo before").unwrap();
        writeln!(file, "echo 'ZeroDivisionError: division by zero' >&2").unwrap();
        writeln!(file, "exit 1").unwrap();

        let document = Document::new(file.path(), "");
        let capture = ExecutionCapture::new(Interpreter::new("sh", "shellscript"));
        let output = capture.capture(&document).await;

        assert_eq!(
            output.text,
            "before\nZeroDivisionError: division by zero\n"
        );
        assert_eq!(
            output.outcome,
            CaptureOutcome::Completed { exit_code: Some(1) }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_timeout() {
        let mut file = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        writeln!(file, "sleep 5").unwrap();

        let document = Document::new(file.path(), "");
        let capture = ExecutionCapture::new(Interpreter::new("sh", "shellscript"))
            .with_timeout(Duration::from_millis(100));

        let err = capture.run(&document).await.unwrap_err();
        assert!(matches!(err, CaptureError::Timeout(d) if d == Duration::from_millis(100)));
        assert_eq!(err.to_string(), "Interpreter timed out after 100ms");

        let output = capture.capture(&document).await;
        assert!(output.is_empty());
        assert!(matches!(output.outcome, CaptureOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_relative_path_with_directory() {
        let root = tempfile::tempdir_in(".").unwrap();
        let cwd = std::env::current_dir().unwrap();
        let relative = root.path().strip_prefix(&cwd).unwrap_or(root.path());
        assert!(relative.is_relative());
        let sub = relative.join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("s.sh"), "echo hi\nls s.sh\n").unwrap();

        let document = Document::new(sub.join("s.sh"), "");
        let capture = ExecutionCapture::new(Interpreter::new("sh", "shellscript"));
        let output = capture.capture(&document).await;

        assert_eq!(output.text, "hi\ns.sh\n");
        assert_eq!(
            output.outcome,
            CaptureOutcome::Completed { exit_code: Some(0) }
        );
    }
}
