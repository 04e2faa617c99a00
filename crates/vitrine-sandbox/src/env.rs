//! The process-wide sandbox environment.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use vitrine_core::{Dom, ElementId};
use vitrine_events::EventBus;
use vitrine_i18n::Catalog;

use crate::capability::SharedCapabilities;
use crate::error::{SandboxError, SandboxResult};
use crate::notify::Notifier;
use crate::options::Options;
use crate::sandbox::Sandbox;
use crate::transport::Transport;

/// A callback run against every newly created sandbox.
pub type SetupCallback = Arc<dyn Fn(&mut Sandbox) -> anyhow::Result<()> + Send + Sync>;

/// Factory for sandboxes.
///
/// Clones share the callback list and the capability table.
#[derive(Clone, Default)]
pub struct SandboxEnv {
    setups: Arc<RwLock<Vec<SetupCallback>>>,
    shared: Arc<RwLock<SharedCapabilities>>,
}

impl SandboxEnv {
    /// Environment with a fresh bus, an empty catalog and no setup callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment around an existing capability table.
    #[must_use]
    pub fn with_capabilities(shared: SharedCapabilities) -> Self {
        Self {
            setups: Arc::default(),
            shared: Arc::new(RwLock::new(shared)),
        }
    }

    /// Append a setup callback. Callbacks run in registration order for
    /// every sandbox created afterwards; the list cannot shrink.
    pub fn setup<F>(&self, callback: F)
    where
        F: Fn(&mut Sandbox) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut setups = self.setups.write().unwrap_or_else(PoisonError::into_inner);
        setups.push(Arc::new(callback));
        debug!(count = setups.len(), "registered sandbox setup callback");
    }

    /// Number of registered setup callbacks.
    #[must_use]
    pub fn setup_count(&self) -> usize {
        self.setups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Install a named shared capability, visible to all sandboxes including
    /// those already created. Returns whether an existing value was replaced.
    pub fn extend(&self, name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) -> bool {
        let name = name.into();
        let replaced = self.write_shared().insert(name.clone(), value);
        if replaced {
            warn!(capability = %name, "replaced shared sandbox capability");
        } else {
            debug!(capability = %name, "added shared sandbox capability");
        }
        replaced
    }

    /// Typed form of [`SandboxEnv::extend`].
    pub fn extend_with<T: Any + Send + Sync>(&self, name: impl Into<String>, value: Arc<T>) -> bool {
        self.extend(name, value)
    }

    /// Replace the event bus.
    pub fn set_bus(&self, bus: EventBus) {
        self.write_shared().bus = bus;
    }

    /// Replace the translation catalog.
    pub fn set_catalog(&self, catalog: Catalog) {
        self.write_shared().catalog = catalog;
    }

    /// Install the AJAX transport.
    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        self.write_shared().transport = Some(transport);
    }

    /// Replace the notification sink.
    pub fn set_notifier(&self, notifier: Arc<dyn Notifier>) {
        self.write_shared().notifier = notifier;
    }

    /// The current event bus.
    #[must_use]
    pub fn bus(&self) -> EventBus {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bus
            .clone()
    }

    /// The current translation catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .catalog
            .clone()
    }

    /// Build a sandbox bound to `element`, running every setup callback.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Setup`] with the position of the first
    /// failing callback. Subscriptions made by earlier callbacks are
    /// released before returning.
    pub fn create(
        &self,
        dom: Arc<dyn Dom>,
        element: ElementId,
        options: Options,
    ) -> SandboxResult<Sandbox> {
        let mut sandbox = Sandbox::new(dom, element, options, Arc::clone(&self.shared));

        // Snapshot so callbacks may register further callbacks.
        let setups: Vec<SetupCallback> = self
            .setups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (index, callback) in setups.iter().enumerate() {
            if let Err(e) = callback(&mut sandbox) {
                warn!(%element, index, error = %e, "sandbox setup callback failed");
                sandbox.release();
                return Err(SandboxError::Setup {
                    index,
                    source: e.into(),
                });
            }
        }

        Ok(sandbox)
    }

    fn write_shared(&self) -> std::sync::RwLockWriteGuard<'_, SharedCapabilities> {
        self.shared.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SandboxEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxEnv")
            .field("setups", &self.setup_count())
            .field("shared", &self.shared)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vitrine_core::{ElementSpec, MemoryDocument};
    use vitrine_events::handler;

    fn document() -> (Arc<dyn Dom>, ElementId) {
        let doc = Arc::new(MemoryDocument::new());
        let el = doc.append(doc.root(), ElementSpec::new("div")).unwrap();
        let dom: Arc<dyn Dom> = doc;
        (dom, el)
    }

    #[test]
    fn test_setup_callbacks_run_in_order() {
        let env = SandboxEnv::new();
        env.setup(|sandbox| {
            sandbox.insert("trail", vec![String::from("first")]);
            Ok(())
        });
        env.setup(|sandbox| {
            let mut trail = sandbox.get::<Vec<String>>("trail").unwrap().as_ref().clone();
            trail.push(String::from("second"));
            sandbox.insert("trail", trail);
            Ok(())
        });

        let (dom, el) = document();
        let sandbox = env.create(dom, el, Options::new()).unwrap();
        assert_eq!(
            sandbox.get::<Vec<String>>("trail").unwrap().as_slice(),
            ["first", "second"]
        );
        assert_eq!(env.setup_count(), 2);
    }

    #[test]
    fn test_each_sandbox_runs_setup_once() {
        let env = SandboxEnv::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        env.setup(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let (dom, el) = document();
        env.create(Arc::clone(&dom), el, Options::new()).unwrap();
        env.create(dom, el, Options::new()).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_setup_reports_index_and_releases() {
        let env = SandboxEnv::new();
        env.setup(|sandbox| {
            sandbox.subscribe("ping", handler(|_| Ok(())));
            Ok(())
        });
        env.setup(|_| anyhow::bail!("no csrf token"));

        let (dom, el) = document();
        let err = env.create(dom, el, Options::new()).unwrap_err();
        assert!(matches!(err, SandboxError::Setup { index: 1, .. }));
        assert!(err.to_string().contains("no csrf token"));
        assert_eq!(env.bus().subscriber_count("ping"), 0);
    }

    #[test]
    fn test_extend_reaches_existing_sandboxes() {
        let env = SandboxEnv::new();
        let (dom, el) = document();
        let sandbox = env.create(dom, el, Options::new()).unwrap();
        assert!(sandbox.shared::<String>("site_title").is_none());

        assert!(!env.extend_with("site_title", Arc::new(String::from("Open Data"))));
        assert_eq!(
            sandbox.shared::<String>("site_title").unwrap().as_str(),
            "Open Data"
        );
        assert!(env.extend_with("site_title", Arc::new(String::from("Dados Abertos"))));
        assert_eq!(
            sandbox.shared::<String>("site_title").unwrap().as_str(),
            "Dados Abertos"
        );
    }

    #[test]
    fn test_set_bus_is_seen_by_existing_sandboxes() {
        let env = SandboxEnv::new();
        let (dom, el) = document();
        let sandbox = env.create(dom, el, Options::new()).unwrap();

        let bus = EventBus::new();
        env.set_bus(bus.clone());
        sandbox.subscribe("ready", handler(|_| Ok(())));
        assert_eq!(bus.subscriber_count("ready"), 1);
    }
}
