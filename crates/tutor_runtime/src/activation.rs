//! Startup sequence: config, capture, prompt, session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn, Instrument};
use tutor_capture::{CapturedOutput, Document, ExecutionCapture, Interpreter};
use tutor_core::PromptContext;
use tutor_llms::providers::openai::OpenAIConfig;
use tutor_llms::{OpenAIProvider, Provider};
use tutor_observability::{capture_span, record_duration};

use crate::chat::ChatSession;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::prompt::{build_prompt, BasePrompt, PERSONA};

/// Language the configured interpreter runs.
pub const INTERPRETER_LANGUAGE: &str = "python";

/// What the host knows at startup.
#[derive(Debug, Clone, Default)]
pub struct ActivationRequest {
    /// The learner's active file, if any
    pub document: Option<PathBuf>,
    /// Overrides the language detected from the file extension
    pub language: Option<String>,
}

impl ActivationRequest {
    pub fn new(document: Option<PathBuf>) -> Self {
        Self {
            document,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Result of startup. `session` is `None` when no document was given; the
/// relay then answers every message with `UninitializedSession`.
pub struct Activation {
    pub config: RuntimeConfig,
    pub document: Option<Document>,
    pub capture: Option<CapturedOutput>,
    pub session: Option<Arc<ChatSession>>,
}

/// Build the OpenAI provider described by the config.
pub fn provider_from_config(config: &RuntimeConfig) -> Result<Arc<dyn Provider>> {
    let mut openai = OpenAIConfig::new(config.api_key.clone());
    if let Some(base_url) = &config.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    Ok(Arc::new(OpenAIProvider::new(openai)?))
}

/// Load config from the environment and start a session.
///
/// A missing credential stops here with `ConfigurationMissing`, before any
/// capture runs or any surface exists.
pub async fn activate_from_env(request: ActivationRequest) -> Result<Activation> {
    let config = RuntimeConfig::from_env()?;
    let provider = provider_from_config(&config)?;
    activate(config, request, provider).await
}

pub async fn activate(
    config: RuntimeConfig,
    request: ActivationRequest,
    provider: Arc<dyn Provider>,
) -> Result<Activation> {
    let Some(path) = request.document.clone() else {
        warn!("No active document, chat session not initialized");
        return Ok(Activation {
            config,
            document: None,
            capture: None,
            session: None,
        });
    };

    let (document, capture, prompt) = prepare(&config, &request, path).await?;
    let session = ChatSession::new(prompt, provider)?.with_config(&config);

    info!(
        session.id = %session.id(),
        model = %session.model(),
        path = %document.path().display(),
        "Chat session ready"
    );

    Ok(Activation {
        config,
        document: Some(document),
        capture: Some(capture),
        session: Some(Arc::new(session)),
    })
}

/// Capture the document and build its base prompt without a provider.
pub async fn prepare(
    config: &RuntimeConfig,
    request: &ActivationRequest,
    path: PathBuf,
) -> Result<(Document, CapturedOutput, BasePrompt)> {
    let mut document = Document::open(path).await?;
    if let Some(language) = &request.language {
        document = document.with_language(language.clone());
    }

    let capture = capture_document(config, &document).await;

    let context = PromptContext::new(
        PERSONA,
        document.text(),
        capture.text.clone(),
    )
    .with_source_path(document.path());
    let prompt = build_prompt(&context);

    Ok((document, capture, prompt))
}

async fn capture_document(config: &RuntimeConfig, document: &Document) -> CapturedOutput {
    let mut executor =
        ExecutionCapture::new(Interpreter::new(&config.interpreter, INTERPRETER_LANGUAGE));
    if let Some(limit) = config.capture_timeout {
        executor = executor.with_timeout(limit);
    }

    let span = capture_span!(config.interpreter, document.path().display());
    async {
        let start = Instant::now();
        let output = executor.capture(document).await;
        record_duration("capture.duration_ms", start.elapsed());
        output
    }
    .instrument(span)
    .await
}
