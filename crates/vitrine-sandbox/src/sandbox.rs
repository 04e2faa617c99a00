//! Per-instance capability object.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use serde_json::Value;
use tracing::{debug, trace};

use vitrine_core::{Dom, ElementId, Selector};
use vitrine_events::{EventBus, Handler, SubscriptionId};
use vitrine_i18n::interpolate;

use crate::capability::SharedCapabilities;
use crate::error::{SandboxError, SandboxResult};
use crate::notify::NotificationKind;
use crate::options::Options;
use crate::transport::{AjaxRequest, AjaxResponse};

/// Option key holding a component's own translation overrides.
const I18N_OPTION: &str = "i18n";

/// Capabilities available to one component instance.
///
/// Created by [`SandboxEnv::create`](crate::SandboxEnv::create). Document
/// queries are scoped to the bound element; bus, catalog, transport and
/// notifier come from the shared table and are looked up on every call.
pub struct Sandbox {
    dom: Arc<dyn Dom>,
    element: ElementId,
    options: Options,
    local: HashMap<String, Arc<dyn Any + Send + Sync>>,
    shared: Arc<RwLock<SharedCapabilities>>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl Sandbox {
    pub(crate) fn new(
        dom: Arc<dyn Dom>,
        element: ElementId,
        options: Options,
        shared: Arc<RwLock<SharedCapabilities>>,
    ) -> Self {
        Self {
            dom,
            element,
            options,
            local: HashMap::new(),
            shared,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// The element this sandbox is bound to.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The component's merged options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The host document.
    #[must_use]
    pub fn dom(&self) -> &Arc<dyn Dom> {
        &self.dom
    }

    /// Descendants of the bound element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Core`] if the selector does not parse.
    pub fn find(&self, selector: &str) -> SandboxResult<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.find_selector(&selector))
    }

    /// Descendants of the bound element matching a parsed selector.
    #[must_use]
    pub fn find_selector(&self, selector: &Selector) -> Vec<ElementId> {
        self.dom.select(self.element, selector)
    }

    /// Attribute of the bound element.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.dom.attribute(self.element, name)
    }

    /// Set an attribute on the bound element.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Core`] if the document rejects the write.
    pub fn set_attribute(&self, name: &str, value: &str) -> SandboxResult<()> {
        Ok(self.dom.set_attribute(self.element, name, value)?)
    }

    /// Install a per-instance capability, returning whether one was replaced.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) -> bool {
        self.local.insert(name.into(), Arc::new(value)).is_some()
    }

    /// Typed lookup of a per-instance capability.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.local
            .get(name)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Whether a per-instance capability exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.local.contains_key(name)
    }

    /// Typed lookup of a named shared capability.
    #[must_use]
    pub fn shared<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.read_shared().get(name)
    }

    /// The shared event bus.
    #[must_use]
    pub fn bus(&self) -> EventBus {
        self.read_shared().bus.clone()
    }

    /// Publish on the shared bus.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Event`] if a handler fails.
    pub fn publish(&self, topic: &str, args: Vec<Value>) -> SandboxResult<()> {
        Ok(self.bus().publish(topic, args)?)
    }

    /// Subscribe on the shared bus. The subscription is tracked and removed
    /// by [`Sandbox::release`].
    pub fn subscribe(&self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        let id = self.bus().subscribe(topic, handler);
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !subscriptions.contains(&id) {
            subscriptions.push(id);
        }
        id
    }

    /// Unsubscribe from the shared bus; see [`EventBus::unsubscribe`].
    pub fn unsubscribe(&self, topic: &str, handler: Option<&Handler>) -> usize {
        self.bus().unsubscribe(topic, handler)
    }

    /// Number of subscriptions made through this sandbox and not yet
    /// released.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let bus = self.bus();
        ids.into_iter()
            .filter(|id| bus.contains_subscription(*id))
            .count()
    }

    /// Translate through the shared catalog.
    #[must_use]
    pub fn translate(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        self.read_shared().catalog.translate(key, placeholders)
    }

    /// Plural translation through the shared catalog.
    #[must_use]
    pub fn translate_plural(
        &self,
        singular: &str,
        plural: &str,
        count: u64,
        placeholders: &[(&str, &str)],
    ) -> String {
        self.read_shared()
            .catalog
            .translate_plural(singular, plural, count, placeholders)
    }

    /// Component-level translation: the `i18n` option's entry for `key`
    /// wins over the shared catalog.
    #[must_use]
    pub fn i18n(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        match self
            .options
            .get_object(I18N_OPTION)
            .and_then(|table| table.get(key))
            .and_then(Value::as_str)
        {
            Some(template) => interpolate(template, placeholders),
            None => self.translate(key, placeholders),
        }
    }

    /// Issue a request through the shared transport.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::MissingCapability`] when no transport is
    /// installed, otherwise the transport's error.
    pub async fn ajax(&self, request: AjaxRequest) -> SandboxResult<AjaxResponse> {
        let transport = self
            .read_shared()
            .transport
            .clone()
            .ok_or_else(|| SandboxError::MissingCapability("transport".to_owned()))?;
        trace!(element = %self.element, url = %request.url, "sandbox ajax");
        transport.send(request).await
    }

    /// Show a notification through the shared notifier.
    pub fn notify(&self, title: &str, message: &str, kind: NotificationKind) {
        let notifier = Arc::clone(&self.read_shared().notifier);
        notifier.notify(title, message, kind);
    }

    /// Remove every subscription made through this sandbox. Returns how
    /// many were still active.
    pub fn release(&self) -> usize {
        let ids = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let bus = self.bus();
        let removed = ids
            .into_iter()
            .filter(|id| bus.unsubscribe_id(*id))
            .count();
        if removed > 0 {
            debug!(element = %self.element, removed, "released sandbox subscriptions");
        }
        removed
    }

    fn read_shared(&self) -> RwLockReadGuard<'_, SharedCapabilities> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut local: Vec<&String> = self.local.keys().collect();
        local.sort();
        f.debug_struct("Sandbox")
            .field("element", &self.element)
            .field("options", &self.options)
            .field("local", &local)
            .finish_non_exhaustive()
    }
}
