//! Relay between the chat session and at most one display surface.
//!
//! ```text
//! surface ──on_user_message──▶ queue ──▶ worker ──respond──▶ ChatSession
//!    ▲                                      │
//!    └──────────── {text} / {error} ────────┘
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use tutor_core::{InboundMessage, OutboundMessage};
use tutor_observability::relay_span;

use crate::chat::ChatSession;
use crate::error::{Result, RuntimeError};

/// A chat panel the relay posts replies to.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    async fn post(&self, message: OutboundMessage) -> Result<()>;

    /// Bring an already-open surface to the front.
    async fn reveal(&self) -> Result<()>;
}

/// Host hook that creates a new display surface.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn DisplaySurface>>;
}

type SurfaceSlot = Arc<Mutex<Option<Arc<dyn DisplaySurface>>>>;

/// Owns the zero-or-one active surface and the ordered request queue.
///
/// One worker task drains the queue, so replies are posted in the order the
/// messages arrived. Closing the surface keeps the session; the next `open`
/// gets a fresh surface bound to the same conversation.
pub struct ChatRelay {
    session: Option<Arc<ChatSession>>,
    factory: Arc<dyn SurfaceFactory>,
    surface: SurfaceSlot,
    queue: Option<mpsc::UnboundedSender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl ChatRelay {
    /// Must be called inside a tokio runtime; spawns the queue worker.
    pub fn new(session: Option<Arc<ChatSession>>, factory: Arc<dyn SurfaceFactory>) -> Self {
        let surface: SurfaceSlot = Arc::new(Mutex::new(None));
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(session.clone(), surface.clone(), rx));

        Self {
            session,
            factory,
            surface,
            queue: Some(tx),
            worker: Some(worker),
        }
    }

    pub fn session(&self) -> Option<&Arc<ChatSession>> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current_surface().is_some()
    }

    /// Create the surface if none is open, otherwise reveal the open one.
    pub async fn open(&self) -> Result<()> {
        let span = relay_span!("open");
        async {
            let existing = {
                let mut slot = lock_slot(&self.surface);
                let existing = slot.clone();
                if existing.is_none() {
                    *slot = Some(self.factory.create()?);
                    info!("Chat surface created");
                }
                existing
            };

            if let Some(surface) = existing {
                debug!("Chat surface already open, revealing");
                surface.reveal().await?;
            }
            Ok::<(), RuntimeError>(())
        }
        .instrument(span)
        .await
    }

    /// Queue a student message. The reply is posted to whichever surface is
    /// open when it is ready.
    pub fn on_user_message(&self, text: impl Into<String>) -> Result<()> {
        let queue = self.queue.as_ref().ok_or(RuntimeError::RelayClosed)?;
        queue
            .send(text.into())
            .map_err(|_| RuntimeError::RelayClosed)
    }

    pub fn on_inbound(&self, message: InboundMessage) -> Result<()> {
        self.on_user_message(message.text)
    }

    /// Drop the surface reference. The session and queued turns survive.
    pub fn on_close(&self) {
        if lock_slot(&self.surface).take().is_some() {
            info!("Chat surface closed");
        }
    }

    /// Stop accepting messages and wait for queued turns to finish.
    pub async fn shutdown(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "Relay worker ended abnormally");
            }
        }
        debug!("Relay shut down");
    }

    fn current_surface(&self) -> Option<Arc<dyn DisplaySurface>> {
        lock_slot(&self.surface).clone()
    }
}

impl Drop for ChatRelay {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

fn lock_slot(
    slot: &SurfaceSlot,
) -> std::sync::MutexGuard<'_, Option<Arc<dyn DisplaySurface>>> {
    // The slot only holds an Arc; a poisoned lock still has a usable value.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_worker(
    session: Option<Arc<ChatSession>>,
    surface: SurfaceSlot,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(text) = rx.recv().await {
        let span = relay_span!("message");
        async {
            let outbound = match &session {
                Some(session) => match session.respond(&text).await {
                    Ok(reply) => OutboundMessage::reply(reply),
                    Err(e) => {
                        // turn-local failures are shown on the surface; log the rest
                        if e.is_turn_local() {
                            debug!(error = %e, "Chat turn failed");
                        } else {
                            warn!(error = %e, "Chat turn failed");
                        }
                        OutboundMessage::error(e.user_message())
                    }
                },
                None => {
                    debug!("Message received without a chat session");
                    OutboundMessage::error(RuntimeError::UninitializedSession.to_string())
                }
            };

            let current = lock_slot(&surface).clone();
            match current {
                Some(target) => {
                    if let Err(e) = target.post(outbound).await {
                        warn!(error = %e, "Failed to post to chat surface");
                    }
                }
                None => debug!("No chat surface open, reply not shown"),
            }
        }
        .instrument(span)
        .await;
    }
}
