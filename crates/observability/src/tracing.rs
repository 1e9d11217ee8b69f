//! Span macros and span-recording helpers

/// Span around one chat turn.
///
/// # Example
///
/// ```rust
/// use tutor_observability::chat_span;
///
/// let span = chat_span!("5f0c...", 3);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! chat_span {
    ($session_id:expr, $turn:expr) => {
        tracing::info_span!(
            "chat.turn",
            session.id = %$session_id,
            chat.turn = $turn,
            chat.duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around one run of the learner's program.
///
/// ```rust
/// use tutor_observability::capture_span;
///
/// let span = capture_span!("python", "/tmp/main.py");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! capture_span {
    ($interpreter:expr, $path:expr) => {
        tracing::info_span!(
            "capture.run",
            capture.interpreter = %$interpreter,
            capture.path = %$path,
            capture.duration_ms = tracing::field::Empty,
        )
    };
}

/// Span around one display-surface event (open, message, close).
#[macro_export]
macro_rules! relay_span {
    ($event:expr) => {
        tracing::info_span!(
            "relay.event",
            relay.event = $event,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span. Emits no log event; the caller
/// that handles the error decides whether and how loudly to log it.
///
/// The span must declare `error` and `error.message` fields for the values
/// to stick.
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
}

/// Record a duration in milliseconds on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
