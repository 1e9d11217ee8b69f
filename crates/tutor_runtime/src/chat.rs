//! Chat session: one conversation, one in-flight provider call at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, Instrument};
use tutor_core::conversation::render_pending;
use tutor_core::{Conversation, SessionId, TokenUsage, Turn};
use tutor_llms::{GenerateRequest, Provider};
use tutor_observability::{chat_span, record_duration, record_error};

use crate::config::{
    RuntimeConfig, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};
use crate::error::{Result, RuntimeError};
use crate::prompt::BasePrompt;

/// Owns the conversation for one activation.
///
/// `respond` takes the conversation lock before anything else. The tokio mutex
/// is fair, so concurrent callers are served in call order and replies are
/// appended in that order regardless of provider latency.
pub struct ChatSession {
    id: SessionId,
    prompt: BasePrompt,
    conversation: Mutex<Conversation>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    request_timeout: Duration,
}

impl ChatSession {
    pub fn new(prompt: BasePrompt, provider: Arc<dyn Provider>) -> Result<Self> {
        let conversation = prompt.to_conversation()?;
        Ok(Self {
            id: SessionId::new(),
            prompt,
            conversation: Mutex::new(conversation),
            provider,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Take model, temperature and timeout from the config.
    pub fn with_config(mut self, config: &RuntimeConfig) -> Self {
        self.model = config.model.clone();
        self.temperature = config.temperature;
        self.request_timeout = config.request_timeout;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn prompt(&self) -> &BasePrompt {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one student message and return the tutor's reply.
    ///
    /// On success the human and assistant turns are appended together. On
    /// failure nothing is appended and the session stays usable.
    pub async fn respond(&self, user_text: &str) -> Result<String> {
        let mut conversation = self.conversation.lock().await;
        let turn = conversation.exchanges().len() / 2 + 1;

        let span = chat_span!(self.id, turn);
        self.exchange(&mut conversation, user_text)
            .instrument(span)
            .await
    }

    async fn exchange(&self, conversation: &mut Conversation, user_text: &str) -> Result<String> {
        let conversation_so_far = render_conversation_so_far(conversation, user_text);
        let request = GenerateRequest::new(
            self.model.clone(),
            self.prompt.render(&conversation_so_far),
        )
        .temperature(self.temperature);

        debug!(
            model = %self.model,
            provider = self.provider.provider_id(),
            chars = conversation_so_far.len(),
            "Sending chat request"
        );

        let start = Instant::now();
        let result =
            tokio::time::timeout(self.request_timeout, self.provider.generate(request)).await;
        record_duration("chat.duration_ms", start.elapsed());

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let err = RuntimeError::ProviderFailed(e);
                record_error(&err);
                return Err(err);
            }
            Err(_) => {
                let err = RuntimeError::Timeout(self.request_timeout);
                record_error(&err);
                return Err(err);
            }
        };

        let mut assistant = Turn::assistant(response.text.clone());
        if let Some(usage) = &response.usage {
            assistant = assistant.with_token_usage(TokenUsage::new(
                usage.prompt_tokens as u64,
                usage.completion_tokens as u64,
            ));
        }
        conversation.append_exchange(Turn::human(user_text), assistant)?;

        info!(turns = conversation.len(), "Chat turn completed");
        Ok(response.text)
    }

    /// Snapshot of the conversation, base turns included.
    pub async fn transcript(&self) -> Vec<Turn> {
        self.conversation.lock().await.turns().to_vec()
    }

    pub async fn turn_count(&self) -> usize {
        self.conversation.lock().await.len()
    }
}

/// Prior exchanges followed by the new student message.
fn render_conversation_so_far(conversation: &Conversation, user_text: &str) -> String {
    let transcript = conversation.render_transcript();
    let pending = render_pending(user_text);
    if transcript.is_empty() {
        pending
    } else {
        format!("{}\n\n{}", transcript, pending)
    }
}
