//! Event bus error types.

use thiserror::Error;

/// Errors surfaced by the event bus.
#[derive(Debug, Error)]
pub enum EventError {
    /// A subscribed handler failed; delivery to later handlers was aborted.
    #[error("handler for topic '{topic}' failed: {source}")]
    Handler {
        /// Topic being delivered when the handler failed.
        topic: String,
        /// The handler's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Bus state lock was poisoned by a panicking handler.
    #[error("event bus lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for event bus operations.
pub type EventResult<T> = Result<T, EventError>;
