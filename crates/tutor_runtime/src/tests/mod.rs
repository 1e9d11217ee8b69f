//! Shared test doubles for the runtime tests.

mod chat_session;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tutor_core::{OutboundMessage, PromptContext};
use tutor_llms::{GenerateRequest, GenerateResponse, Headers, Provider, Usage};

use crate::chat::ChatSession;
use crate::error::Result;
use crate::prompt::{build_prompt, PERSONA};
use crate::relay::{DisplaySurface, SurfaceFactory};

#[derive(Clone)]
pub(crate) enum Script {
    Reply { text: String, delay: Duration },
    Fail { status: u16 },
    Hang,
}

impl Script {
    pub(crate) fn reply(text: &str, delay_ms: u64) -> Self {
        Script::Reply {
            text: text.to_string(),
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Answers by the latest student message in the request.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, student_text: &str, script: Script) -> Self {
        self.scripts.insert(student_text.to_string(), script);
        self
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Text after the last `Student: ` marker, up to the end of that line.
pub(crate) fn latest_student_message(request: &GenerateRequest) -> String {
    let human = &request.messages[1].content;
    let start = human.rfind("Student: ").map(|i| i + "Student: ".len()).unwrap_or(0);
    human[start..].lines().next().unwrap_or_default().to_string()
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn build_headers(&self) -> Headers {
        Headers::new()
    }

    async fn generate(&self, request: GenerateRequest) -> tutor_llms::Result<GenerateResponse> {
        let student = latest_student_message(&request);
        self.requests.lock().unwrap().push(request);

        let script = self
            .scripts
            .get(&student)
            .cloned()
            .unwrap_or_else(|| Script::reply(&format!("reply to {}", student), 0));

        match script {
            Script::Reply { text, delay } => {
                tokio::time::sleep(delay).await;
                let mut response = GenerateResponse::text(text);
                response.usage = Some(Usage {
                    prompt_tokens: 100,
                    completion_tokens: 10,
                    total_tokens: 110,
                });
                Ok(response)
            }
            Script::Fail { status } => Err(tutor_llms::Error::api(
                "scripted",
                status,
                "provider unavailable",
            )),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(GenerateResponse::text("too late"))
            }
        }
    }
}

pub(crate) fn scenario_context() -> PromptContext {
    PromptContext::new(PERSONA, "def f(): return 1/0", "ZeroDivisionError")
}

pub(crate) fn session_with(provider: Arc<ScriptedProvider>) -> ChatSession {
    ChatSession::new(build_prompt(&scenario_context()), provider).unwrap()
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    posts: Mutex<Vec<OutboundMessage>>,
    reveals: AtomicUsize,
}

impl RecordingSurface {
    pub(crate) fn posts(&self) -> Vec<OutboundMessage> {
        self.posts.lock().unwrap().clone()
    }

    pub(crate) fn reveals(&self) -> usize {
        self.reveals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DisplaySurface for RecordingSurface {
    async fn post(&self, message: OutboundMessage) -> Result<()> {
        self.posts.lock().unwrap().push(message);
        Ok(())
    }

    async fn reveal(&self) -> Result<()> {
        self.reveals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Keeps every surface it creates so tests can inspect them.
#[derive(Default)]
pub(crate) struct RecordingFactory {
    created: Mutex<Vec<Arc<RecordingSurface>>>,
}

impl RecordingFactory {
    pub(crate) fn created(&self) -> Vec<Arc<RecordingSurface>> {
        self.created.lock().unwrap().clone()
    }
}

impl SurfaceFactory for RecordingFactory {
    fn create(&self) -> Result<Arc<dyn DisplaySurface>> {
        let surface = Arc::new(RecordingSurface::default());
        self.created.lock().unwrap().push(surface.clone());
        Ok(surface as Arc<dyn DisplaySurface>)
    }
}
