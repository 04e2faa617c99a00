//! Declarative activation of modules on annotated elements.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vitrine_core::{Dom, ElementId};
use vitrine_sandbox::{Options, Sandbox, SandboxEnv};

use crate::component::Component;
use crate::error::{ModuleError, ModuleResult};
use crate::options::extract_options;
use crate::registry::{ModuleDescriptor, ModuleRegistry};

/// Attribute naming the modules of an element.
pub const DEFAULT_MODULE_ATTRIBUTE: &str = "data-module";

/// Attribute names used by the activator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSettings {
    /// Attribute holding space-separated module names.
    pub module_attribute: String,
    /// Prefix of option attributes (`<prefix>-<key>`).
    pub option_prefix: String,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            module_attribute: DEFAULT_MODULE_ATTRIBUTE.to_owned(),
            option_prefix: DEFAULT_MODULE_ATTRIBUTE.to_owned(),
        }
    }
}

/// Outcome of one activation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    /// Instances created and initialized.
    pub created: usize,
    /// Names in the attribute with no registered module.
    pub skipped_unknown: usize,
    /// (element, module) pairs that already had an instance.
    pub skipped_bound: usize,
    /// Instances whose sandbox, factory or `initialize` failed.
    pub failed: usize,
}

struct Instance {
    module: String,
    element: ElementId,
    sandbox: Arc<Sandbox>,
    component: Box<dyn Component>,
}

impl Instance {
    fn destroy(mut self) {
        self.component.teardown();
        self.sandbox.release();
        debug!(module = %self.module, element = %self.element, "Module torn down");
    }
}

/// Binds registered modules to annotated elements and tracks the live
/// instances.
///
/// No lock is held while factories or component lifecycle methods run, so
/// a component may publish, subscribe or start a nested scan from
/// `initialize`.
pub struct Activator {
    registry: Arc<ModuleRegistry>,
    env: SandboxEnv,
    settings: ActivationSettings,
    /// (element, module) pairs with a live or initializing instance.
    bound: Mutex<HashSet<(ElementId, String)>>,
    instances: Mutex<Vec<Instance>>,
}

impl Activator {
    /// Create an activator with the default attribute names.
    #[must_use]
    pub fn new(registry: Arc<ModuleRegistry>, env: SandboxEnv) -> Self {
        Self::with_settings(registry, env, ActivationSettings::default())
    }

    /// Create an activator with custom attribute names.
    #[must_use]
    pub fn with_settings(
        registry: Arc<ModuleRegistry>,
        env: SandboxEnv,
        settings: ActivationSettings,
    ) -> Self {
        Self {
            registry,
            env,
            settings,
            bound: Mutex::new(HashSet::new()),
            instances: Mutex::new(Vec::new()),
        }
    }

    /// The attribute names in use.
    #[must_use]
    pub fn settings(&self) -> &ActivationSettings {
        &self.settings
    }

    /// Activate every annotated element of the document.
    ///
    /// # Errors
    ///
    /// See [`Activator::scan_within`].
    pub fn scan(&self, dom: &Arc<dyn Dom>) -> ModuleResult<ActivationReport> {
        self.scan_within(dom, dom.root())
    }

    /// Activate annotated elements in the subtree rooted at `root`
    /// (including `root`), in document order.
    ///
    /// Unknown module names and already bound elements are skipped.
    /// Component failures are logged and counted; they do not stop the
    /// pass. The bus queues events for the duration of the pass and
    /// replays them at the end, unless it was already queuing.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::Event`] if a handler fails while the queued
    /// events are replayed.
    pub fn scan_within(&self, dom: &Arc<dyn Dom>, root: ElementId) -> ModuleResult<ActivationReport> {
        let bus = self.env.bus();
        let owns_queue = !bus.is_queuing();
        if owns_queue {
            bus.enqueue();
        }

        let mut report = ActivationReport::default();
        for element in dom.with_attribute(root, &self.settings.module_attribute) {
            let Some(names) = dom.attribute(element, &self.settings.module_attribute) else {
                continue;
            };
            for name in names.split_whitespace() {
                if !self.registry.contains(name) {
                    debug!(module = name, %element, "Skipping unknown module");
                    report.skipped_unknown = report.skipped_unknown.saturating_add(1);
                    continue;
                }
                match self.instantiate(dom, name, element) {
                    Ok(()) => report.created = report.created.saturating_add(1),
                    Err(ModuleError::AlreadyBound { .. }) => {
                        report.skipped_bound = report.skipped_bound.saturating_add(1);
                    },
                    Err(e) => {
                        warn!(module = name, %element, error = %e, "Module failed to activate");
                        report.failed = report.failed.saturating_add(1);
                    },
                }
            }
        }

        if owns_queue {
            bus.dequeue()?;
        }

        info!(
            created = report.created,
            skipped_unknown = report.skipped_unknown,
            skipped_bound = report.skipped_bound,
            failed = report.failed,
            "Module activation pass complete"
        );
        Ok(report)
    }

    /// Create and initialize one instance of `name` on `element`.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::UnknownModule`], [`ModuleError::AlreadyBound`],
    /// [`ModuleError::Sandbox`] if a setup callback fails,
    /// [`ModuleError::Factory`] or [`ModuleError::Initialize`]. On error the
    /// sandbox is released and nothing is recorded.
    pub fn instantiate(&self, dom: &Arc<dyn Dom>, name: &str, element: ElementId) -> ModuleResult<()> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| ModuleError::UnknownModule(name.to_owned()))?;

        let key = (element, name.to_owned());
        if !self.lock_bound().insert(key.clone()) {
            return Err(ModuleError::AlreadyBound {
                module: name.to_owned(),
                element,
            });
        }

        match self.build(dom, &descriptor, element) {
            Ok(instance) => {
                debug!(module = name, %element, "Module initialized");
                self.lock_instances().push(instance);
                Ok(())
            },
            Err(e) => {
                self.lock_bound().remove(&key);
                Err(e)
            },
        }
    }

    fn build(
        &self,
        dom: &Arc<dyn Dom>,
        descriptor: &ModuleDescriptor,
        element: ElementId,
    ) -> ModuleResult<Instance> {
        let name = descriptor.name();
        let options: Options =
            extract_options(&**dom, element, &self.settings.option_prefix, descriptor.schema());
        let sandbox = Arc::new(self.env.create(Arc::clone(dom), element, options.clone())?);

        let mut component = match (descriptor.factory())(element, &options, Arc::clone(&sandbox)) {
            Ok(component) => component,
            Err(e) => {
                sandbox.release();
                return Err(ModuleError::Factory {
                    module: name.to_owned(),
                    source: e.into(),
                });
            },
        };

        if let Err(e) = component.initialize() {
            sandbox.release();
            return Err(ModuleError::Initialize {
                module: name.to_owned(),
                source: e.into(),
            });
        }

        Ok(Instance {
            module: name.to_owned(),
            element,
            sandbox,
            component,
        })
    }

    /// Tear down every instance whose element is no longer attached to the
    /// document. Returns how many were torn down.
    pub fn reap(&self, dom: &dyn Dom) -> usize {
        let detached: Vec<Instance> = {
            let mut instances = self.lock_instances();
            let (gone, live): (Vec<Instance>, Vec<Instance>) = std::mem::take(&mut *instances)
                .into_iter()
                .partition(|i| !dom.is_attached(i.element));
            *instances = live;
            gone
        };
        self.destroy_all(detached)
    }

    /// Tear down every instance. Returns how many were torn down.
    pub fn teardown_all(&self) -> usize {
        let all = std::mem::take(&mut *self.lock_instances());
        self.destroy_all(all)
    }

    fn destroy_all(&self, instances: Vec<Instance>) -> usize {
        let count = instances.len();
        {
            let mut bound = self.lock_bound();
            for instance in &instances {
                bound.remove(&(instance.element, instance.module.clone()));
            }
        }
        for instance in instances {
            instance.destroy();
        }
        if count > 0 {
            info!(count, "Torn down module instances");
        }
        count
    }

    /// Elements carrying an instance of `name`, in creation order.
    #[must_use]
    pub fn instances(&self, name: &str) -> Vec<ElementId> {
        self.lock_instances()
            .iter()
            .filter(|i| i.module == name)
            .map(|i| i.element)
            .collect()
    }

    /// Modules bound to `element`, in creation order.
    #[must_use]
    pub fn modules_on(&self, element: ElementId) -> Vec<String> {
        self.lock_instances()
            .iter()
            .filter(|i| i.element == element)
            .map(|i| i.module.clone())
            .collect()
    }

    /// Number of live instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.lock_instances().len()
    }

    /// Whether any module instance is bound to `element`.
    #[must_use]
    pub fn is_bound(&self, element: ElementId) -> bool {
        self.lock_instances().iter().any(|i| i.element == element)
    }

    fn lock_bound(&self) -> std::sync::MutexGuard<'_, HashSet<(ElementId, String)>> {
        self.bound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_instances(&self) -> std::sync::MutexGuard<'_, Vec<Instance>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("settings", &self.settings)
            .field("modules", &self.registry.names())
            .field("instances", &self.instance_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};
    use vitrine_core::{ElementSpec, MemoryDocument};
    use vitrine_events::handler;

    use crate::component::factory;
    use crate::schema::{OptionKind, OptionSchema};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Subscribes to `announce` on init, publishes its `label` option, and
    /// records everything it hears.
    struct Announcer {
        label: String,
        sandbox: Arc<Sandbox>,
        heard: Log,
        teardowns: Arc<AtomicUsize>,
    }

    impl Component for Announcer {
        fn initialize(&mut self) -> anyhow::Result<()> {
            let heard = Arc::clone(&self.heard);
            let me = self.label.clone();
            self.sandbox.subscribe(
                "announce",
                handler(move |args| {
                    let from = args.first().and_then(Value::as_str).unwrap_or_default();
                    heard.lock().unwrap().push(format!("{me}<-{from}"));
                    Ok(())
                }),
            );
            self.sandbox.publish("announce", vec![json!(self.label)])?;
            Ok(())
        }

        fn teardown(&mut self) {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        doc: Arc<MemoryDocument>,
        dom: Arc<dyn Dom>,
        env: SandboxEnv,
        registry: Arc<ModuleRegistry>,
        activator: Activator,
        heard: Log,
        teardowns: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let doc = Arc::new(MemoryDocument::new());
        let dom: Arc<dyn Dom> = doc.clone();
        let env = SandboxEnv::new();
        let registry = Arc::new(ModuleRegistry::new());
        let heard = Log::default();
        let teardowns = Arc::new(AtomicUsize::new(0));

        let (log, count) = (Arc::clone(&heard), Arc::clone(&teardowns));
        registry
            .register(
                "announcer",
                factory(move |_, options, sandbox| {
                    Ok(Box::new(Announcer {
                        label: options.get_str("label").unwrap_or_default().to_owned(),
                        sandbox,
                        heard: Arc::clone(&log),
                        teardowns: Arc::clone(&count),
                    }))
                }),
                OptionSchema::new().option("label", OptionKind::String, "anon"),
            )
            .unwrap();

        let activator = Activator::new(Arc::clone(&registry), env.clone());
        Fixture {
            doc,
            dom,
            env,
            registry,
            activator,
            heard,
            teardowns,
        }
    }

    fn annotate(doc: &MemoryDocument, modules: &str, label: &str) -> ElementId {
        doc.append(
            doc.root(),
            ElementSpec::new("div")
                .attr("data-module", modules)
                .attr("data-module-label", label),
        )
        .unwrap()
    }

    #[test]
    fn test_scan_creates_instances_in_document_order() {
        let f = fixture();
        let first = annotate(&f.doc, "announcer", "first");
        let second = annotate(&f.doc, "announcer", "second");

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(f.activator.instances("announcer"), vec![first, second]);
        assert!(f.activator.is_bound(first));
        assert_eq!(f.activator.modules_on(second), vec!["announcer"]);
    }

    #[test]
    fn test_events_during_scan_reach_later_components() {
        let f = fixture();
        annotate(&f.doc, "announcer", "first");
        annotate(&f.doc, "announcer", "second");

        f.activator.scan(&f.dom).unwrap();
        let heard = f.heard.lock().unwrap().clone();
        assert_eq!(
            heard,
            vec!["first<-first", "second<-first", "first<-second", "second<-second"]
        );
        assert!(!f.env.bus().is_queuing());
    }

    #[test]
    fn test_rescan_skips_bound_and_unknown() {
        let f = fixture();
        annotate(&f.doc, "announcer missing", "only");

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped_unknown, 1);

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(
            report,
            ActivationReport {
                created: 0,
                skipped_unknown: 1,
                skipped_bound: 1,
                failed: 0,
            }
        );
        assert_eq!(f.activator.instance_count(), 1);
    }

    #[test]
    fn test_multiple_modules_on_one_element() {
        let f = fixture();
        f.registry
            .register(
                "echo",
                factory(|_, _, sandbox| {
                    Ok(Box::new(Announcer {
                        label: "echo".to_owned(),
                        sandbox,
                        heard: Log::default(),
                        teardowns: Arc::new(AtomicUsize::new(0)),
                    }))
                }),
                OptionSchema::new(),
            )
            .unwrap();
        let el = annotate(&f.doc, "announcer  echo", "both");

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(f.activator.modules_on(el), vec!["announcer", "echo"]);
    }

    #[test]
    fn test_failures_are_counted_and_released() {
        let f = fixture();
        f.registry
            .register(
                "broken-factory",
                factory(|_, _, _| anyhow::bail!("missing template")),
                OptionSchema::new(),
            )
            .unwrap();

        struct FailsAfterSubscribing(Arc<Sandbox>);
        impl Component for FailsAfterSubscribing {
            fn initialize(&mut self) -> anyhow::Result<()> {
                self.0.subscribe("leaky", handler(|_| Ok(())));
                anyhow::bail!("no endpoint")
            }
            fn teardown(&mut self) {}
        }
        f.registry
            .register(
                "broken-init",
                factory(|_, _, sandbox| Ok(Box::new(FailsAfterSubscribing(sandbox)))),
                OptionSchema::new(),
            )
            .unwrap();

        annotate(&f.doc, "broken-factory", "a");
        let broken = annotate(&f.doc, "broken-init", "b");
        annotate(&f.doc, "announcer", "c");

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.created, 1);
        assert_eq!(f.env.bus().subscriber_count("leaky"), 0);
        assert!(!f.activator.is_bound(broken));

        let err = f.activator.instantiate(&f.dom, "broken-init", broken).unwrap_err();
        assert!(matches!(err, ModuleError::Initialize { .. }));
    }

    #[test]
    fn test_setup_failure_counts_as_failed() {
        let f = fixture();
        f.env.setup(|_| anyhow::bail!("setup refused"));
        annotate(&f.doc, "announcer", "x");

        let report = f.activator.scan(&f.dom).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(f.activator.instance_count(), 0);
    }

    #[test]
    fn test_scan_within_limits_to_subtree() {
        let f = fixture();
        let section = f
            .doc
            .append(
                f.doc.root(),
                ElementSpec::new("section")
                    .child(ElementSpec::new("div").attr("data-module", "announcer")),
            )
            .unwrap();
        annotate(&f.doc, "announcer", "outside");

        let report = f.activator.scan_within(&f.dom, section).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(f.activator.instance_count(), 1);
    }

    #[test]
    fn test_scan_leaves_foreign_queue_alone() {
        let f = fixture();
        annotate(&f.doc, "announcer", "queued");
        let bus = f.env.bus();
        bus.enqueue();

        f.activator.scan(&f.dom).unwrap();
        assert!(bus.is_queuing());
        assert!(f.heard.lock().unwrap().is_empty());

        bus.dequeue().unwrap();
        assert_eq!(f.heard.lock().unwrap().as_slice(), ["queued<-queued"]);
    }

    #[test]
    fn test_reap_tears_down_detached_once() {
        let f = fixture();
        let kept = annotate(&f.doc, "announcer", "kept");
        let removed = annotate(&f.doc, "announcer", "removed");
        f.activator.scan(&f.dom).unwrap();
        assert_eq!(f.env.bus().subscriber_count("announce"), 2);

        f.doc.remove(removed).unwrap();
        assert_eq!(f.activator.reap(&*f.dom), 1);
        assert_eq!(f.activator.reap(&*f.dom), 0);
        assert_eq!(f.teardowns.load(Ordering::SeqCst), 1);
        assert_eq!(f.activator.instances("announcer"), vec![kept]);
        assert_eq!(f.env.bus().subscriber_count("announce"), 1);

        // a re-attached element can be activated again
        f.doc.attach(f.doc.root(), removed).unwrap();
        assert_eq!(f.activator.scan(&f.dom).unwrap().created, 1);
    }

    #[test]
    fn test_teardown_all() {
        let f = fixture();
        annotate(&f.doc, "announcer", "a");
        annotate(&f.doc, "announcer", "b");
        f.activator.scan(&f.dom).unwrap();

        assert_eq!(f.activator.teardown_all(), 2);
        assert_eq!(f.teardowns.load(Ordering::SeqCst), 2);
        assert_eq!(f.activator.instance_count(), 0);
        assert!(f.env.bus().topics().is_empty());
    }

    #[test]
    fn test_instantiate_unknown_module() {
        let f = fixture();
        let el = annotate(&f.doc, "announcer", "x");
        assert!(matches!(
            f.activator.instantiate(&f.dom, "nope", el),
            Err(ModuleError::UnknownModule(_))
        ));
    }
}
