//! Capabilities shared by every sandbox.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use vitrine_events::EventBus;
use vitrine_i18n::Catalog;

use crate::notify::{LogNotifier, Notifier};
use crate::transport::Transport;

/// The shared capability table.
///
/// Sandboxes hold a handle to one table and read it on every call, so a
/// capability installed or replaced here is seen by sandboxes built earlier.
#[derive(Clone)]
pub struct SharedCapabilities {
    /// The topic bus.
    pub bus: EventBus,
    /// The translation catalog.
    pub catalog: Catalog,
    /// Network transport for AJAX requests, if configured.
    pub transport: Option<Arc<dyn Transport>>,
    /// Notification sink.
    pub notifier: Arc<dyn Notifier>,
    extensions: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl SharedCapabilities {
    /// Table with a fresh bus, an empty catalog, no transport and a
    /// logging notifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
            catalog: Catalog::new(),
            transport: None,
            notifier: Arc::new(LogNotifier),
            extensions: HashMap::new(),
        }
    }

    /// Install a named shared value, returning whether one was replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) -> bool {
        self.extensions.insert(name.into(), value).is_some()
    }

    /// Typed lookup of a named shared value.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.extensions
            .get(name)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Whether a named shared value exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Names of installed shared values, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for SharedCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCapabilities")
            .field("bus", &self.bus)
            .field("has_transport", &self.transport.is_some())
            .field("extensions", &self.names())
            .finish_non_exhaustive()
    }
}
