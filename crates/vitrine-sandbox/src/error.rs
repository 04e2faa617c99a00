//! Sandbox error types.

use thiserror::Error;

use vitrine_core::CoreError;
use vitrine_events::EventError;

/// Errors raised by sandboxes and their capabilities.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// A setup callback failed while a sandbox was being constructed.
    #[error("sandbox setup callback #{index} failed: {source}")]
    Setup {
        /// Position of the callback in registration order.
        index: usize,
        /// The callback's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A required shared capability has not been installed.
    #[error("capability not available: {0}")]
    MissingCapability(String),

    /// The network transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request URL could not be resolved.
    #[error("invalid request url '{url}': {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Document access failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Publishing through the sandbox failed.
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;
