//! The application context.

use std::fmt;
use std::sync::Arc;

use tracing::info;
use vitrine_config::Config;
use vitrine_core::{Dom, ElementId};
use vitrine_events::EventBus;
use vitrine_filters::{FilterStore, Navigator};
use vitrine_i18n::Catalog;
use vitrine_modules::{ActivationReport, Activator, Factory, ModuleRegistry, OptionSchema};
use vitrine_sandbox::{Notifier, SandboxEnv, Transport};

use crate::config_bridge;
use crate::error::RuntimeResult;

/// Builder for [`Application`].
///
/// Anything not supplied is derived from the [`Config`]: the catalog from
/// `[i18n]`, an [`HttpTransport`](vitrine_sandbox::HttpTransport) from
/// `[http]`. The notifier defaults to
/// [`LogNotifier`](vitrine_sandbox::LogNotifier).
pub struct ApplicationBuilder {
    config: Config,
    navigator: Arc<dyn Navigator>,
    catalog: Option<Catalog>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ApplicationBuilder {
    /// Start from `config`; filter changes navigate through `navigator`.
    #[must_use]
    pub fn new(config: Config, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            config,
            navigator,
            catalog: None,
            transport: None,
            notifier: None,
        }
    }

    /// Use an already loaded catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a custom transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom notifier.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the services.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file or the transport described by
    /// the config cannot be loaded or built.
    pub fn build(self) -> RuntimeResult<Application> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => config_bridge::to_catalog(&self.config)?,
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(config_bridge::to_transport(&self.config)?),
        };

        let env = SandboxEnv::new();
        env.set_catalog(catalog);
        env.set_transport(transport);
        if let Some(notifier) = self.notifier {
            env.set_notifier(notifier);
        }

        let registry = Arc::new(ModuleRegistry::new());
        let activator = Activator::with_settings(
            Arc::clone(&registry),
            env.clone(),
            config_bridge::to_activation_settings(&self.config),
        );

        info!(
            module_attribute = %self.config.activation.module_attribute,
            filter_param = %self.config.filters.param,
            "Application ready"
        );

        Ok(Application {
            config: self.config,
            env,
            registry,
            activator,
            navigator: self.navigator,
        })
    }
}

/// Owns the process-wide services of a page: the bus (through the sandbox
/// environment), the module registry, the activator and the navigator used
/// by filter stores.
///
/// There are no globals; hosts pass the application (or the services they
/// need) explicitly. Dropping it tears down every live instance.
pub struct Application {
    config: Config,
    env: SandboxEnv,
    registry: Arc<ModuleRegistry>,
    activator: Activator,
    navigator: Arc<dyn Navigator>,
}

impl Application {
    /// Start building an application.
    #[must_use]
    pub fn builder(config: Config, navigator: Arc<dyn Navigator>) -> ApplicationBuilder {
        ApplicationBuilder::new(config, navigator)
    }

    /// The configuration the services were built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared event bus.
    #[must_use]
    pub fn bus(&self) -> EventBus {
        self.env.bus()
    }

    /// The sandbox environment, for `setup` callbacks and shared
    /// capabilities.
    #[must_use]
    pub fn env(&self) -> &SandboxEnv {
        &self.env
    }

    /// The module registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The activator.
    #[must_use]
    pub fn activator(&self) -> &Activator {
        &self.activator
    }

    /// Register a module.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Module`](crate::RuntimeError::Module) for a
    /// duplicate or invalid name, or a non-conforming default.
    pub fn register(&self, name: &str, factory: Factory, schema: OptionSchema) -> RuntimeResult<()> {
        self.registry.register(name, factory, schema)?;
        Ok(())
    }

    /// Activate every annotated element of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler fails while queued events are
    /// delivered at the end of the pass.
    pub fn activate(&self, dom: &Arc<dyn Dom>) -> RuntimeResult<ActivationReport> {
        Ok(self.activator.scan(dom)?)
    }

    /// Activate the annotated elements under `root` (inserted content).
    ///
    /// # Errors
    ///
    /// See [`Application::activate`].
    pub fn activate_within(&self, dom: &Arc<dyn Dom>, root: ElementId) -> RuntimeResult<ActivationReport> {
        Ok(self.activator.scan_within(dom, root)?)
    }

    /// Tear down instances whose elements left the document.
    pub fn reap(&self, dom: &dyn Dom) -> usize {
        self.activator.reap(dom)
    }

    /// Filter store for `page_url`, reading the configured parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Filter`](crate::RuntimeError::Filter) if
    /// `page_url` is not an absolute URL.
    pub fn filters(&self, page_url: &str) -> RuntimeResult<FilterStore> {
        Ok(FilterStore::with_param(
            page_url,
            &self.config.filters.param,
            Arc::clone(&self.navigator),
        )?)
    }

    /// Tear down every live instance (page unload).
    pub fn shutdown(&self) -> usize {
        let count = self.activator.teardown_all();
        info!(count, "Application shut down");
        count
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.activator.teardown_all();
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("activator", &self.activator)
            .finish_non_exhaustive()
    }
}
