//! Shared harness: an application wired to mocks and the catalog page.

use std::sync::{Arc, Mutex};

use vitrine_i18n::Catalog;
use vitrine_modules::{Component, OptionSchema, factory};
use vitrine_runtime::Application;
use vitrine_sandbox::Sandbox;
use vitrine_test::{
    CatalogPage, MockTransport, RecordingNavigator, RecordingNotifier, catalog_page,
    pt_br_catalog, test_config,
};

/// Shared, ordered record of lifecycle calls.
pub type Log = Arc<Mutex<Vec<String>>>;

/// Extra behaviour run by a [`Probe`] after it logs its initialization.
pub type Hook = Arc<dyn Fn(&Arc<Sandbox>, &Log) -> anyhow::Result<()> + Send + Sync>;

/// A component that records its lifecycle and runs a hook on initialize.
pub struct Probe {
    module: String,
    sandbox: Arc<Sandbox>,
    log: Log,
    hook: Hook,
}

impl Component for Probe {
    fn initialize(&mut self) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("init {}", self.module));
        (self.hook)(&self.sandbox, &self.log)
    }

    fn teardown(&mut self) {
        self.log.lock().unwrap().push(format!("teardown {}", self.module));
    }
}

/// Wrap a closure into a [`Hook`].
#[allow(dead_code)]
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&Arc<Sandbox>, &Log) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An application over the catalog page with every external seam mocked.
#[allow(dead_code)]
pub struct AppHarness {
    /// The application under test.
    pub app: Application,
    /// The search page.
    pub page: CatalogPage,
    /// AJAX mock.
    pub transport: Arc<MockTransport>,
    /// Notification recorder.
    pub notifier: Arc<RecordingNotifier>,
    /// Navigation recorder.
    pub navigator: Arc<RecordingNavigator>,
    /// Lifecycle log shared by every probe.
    pub log: Log,
}

#[allow(dead_code)]
impl AppHarness {
    /// Build a harness whose transport replays `transport`'s queue.
    pub fn with_transport(transport: MockTransport) -> Self {
        vitrine_test::setup_test_logging_default();

        let catalog = Catalog::new();
        catalog.load(&pt_br_catalog()).unwrap();

        let transport = Arc::new(transport);
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let app = Application::builder(test_config(), navigator.clone())
            .catalog(catalog)
            .transport(transport.clone())
            .notifier(notifier.clone())
            .build()
            .unwrap();

        Self {
            app,
            page: catalog_page(),
            transport,
            notifier,
            navigator,
            log: Arc::default(),
        }
    }

    /// Build a harness with an empty transport queue.
    pub fn new() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Register a [`Probe`] module that only logs.
    pub fn register(&self, name: &str, schema: OptionSchema) {
        self.register_with(name, schema, hook(|_, _| Ok(())));
    }

    /// Register a [`Probe`] module running `hook` on initialize.
    pub fn register_with(&self, name: &str, schema: OptionSchema, hook: Hook) {
        let module = name.to_owned();
        let log = Arc::clone(&self.log);
        self.app
            .register(
                name,
                factory(move |_, _, sandbox| {
                    Ok(Box::new(Probe {
                        module: module.clone(),
                        sandbox,
                        log: Arc::clone(&log),
                        hook: Arc::clone(&hook),
                    }))
                }),
                schema,
            )
            .unwrap();
    }

    /// Entries of the lifecycle log.
    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// How many log entries equal `entry`.
    pub fn count(&self, entry: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}
