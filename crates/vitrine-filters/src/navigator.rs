//! Navigation seam.

use std::sync::{Mutex, PoisonError};

use tracing::info;
use url::Url;

/// Performs the navigation that applies a filter change.
pub trait Navigator: Send + Sync {
    /// Navigate to `url`.
    fn navigate(&self, url: &Url);
}

/// Navigator that records destinations instead of leaving the page.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<Url> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent destination.
    #[must_use]
    pub fn last(&self) -> Option<Url> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) {
        info!(%url, "navigating");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
    }
}
