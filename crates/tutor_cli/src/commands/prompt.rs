//! `tutor prompt`: show the base prompt without calling the model.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tutor_capture::{CaptureOutcome, CapturedOutput};
use tutor_runtime::activation::prepare;
use tutor_runtime::{ActivationRequest, RuntimeConfig};

use crate::output;

pub async fn handle(
    file: PathBuf,
    language: Option<String>,
    interpreter: Option<String>,
) -> Result<()> {
    let mut config = RuntimeConfig::from_env_without_key()?;
    if let Some(interpreter) = interpreter {
        config = config.with_interpreter(interpreter);
    }

    let mut request = ActivationRequest::new(Some(file.clone()));
    if let Some(language) = language {
        request = request.with_language(language);
    }

    let spinner = output::spinner(&format!("Running {}", file.display()));
    let prepared = prepare(&config, &request, file).await;
    output::spinner_done(&spinner);
    let (document, capture, prompt) = prepared?;

    if output::is_json() {
        output::data(
            "prompt",
            &json!({
                "path": document.path(),
                "language": document.language_id(),
                "capture": capture,
                "system": prompt.system(),
                "template": prompt.template(),
            }),
        );
        return Ok(());
    }

    output::header("System");
    println!("{}\n", prompt.system());
    output::header("Human");
    println!("{}\n", prompt.template());
    output::kv("Capture:", &describe_capture(&capture));

    Ok(())
}

/// One-line summary of how the capture went.
pub(crate) fn describe_capture(capture: &CapturedOutput) -> String {
    match &capture.outcome {
        CaptureOutcome::Completed { exit_code } => format!(
            "exit {} after {} ms, {} bytes",
            exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            capture.duration_ms,
            capture.text.len()
        ),
        CaptureOutcome::Skipped { language_id } => format!(
            "not run ({} files are not executed)",
            language_id.as_deref().unwrap_or("unknown")
        ),
        CaptureOutcome::Failed { reason } => format!("failed: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_capture() {
        let completed = CapturedOutput {
            text: "boom\n".to_string(),
            outcome: CaptureOutcome::Completed { exit_code: Some(1) },
            duration_ms: 42,
        };
        assert_eq!(describe_capture(&completed), "exit 1 after 42 ms, 5 bytes");

        let skipped = CapturedOutput {
            text: String::new(),
            outcome: CaptureOutcome::Skipped {
                language_id: Some("javascript".to_string()),
            },
            duration_ms: 0,
        };
        assert_eq!(
            describe_capture(&skipped),
            "not run (javascript files are not executed)"
        );
    }
}
