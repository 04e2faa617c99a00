//! The component lifecycle contract.

use std::sync::Arc;

use vitrine_core::ElementId;
use vitrine_sandbox::{Options, Sandbox};

/// A live module instance bound to one element.
///
/// `initialize` runs once, right after the factory returns. `teardown` runs
/// once when the element leaves the document or the application shuts down;
/// subscriptions made through the sandbox are released after it returns.
pub trait Component: Send {
    /// Start the component: bind listeners, subscribe to topics, render.
    ///
    /// # Errors
    ///
    /// An error discards the instance and releases its sandbox.
    fn initialize(&mut self) -> anyhow::Result<()>;

    /// Stop the component and drop any host resources it holds.
    fn teardown(&mut self);
}

/// Builds a component for an element.
///
/// Receives the bound element, the merged options and the instance's
/// sandbox.
pub type Factory =
    Arc<dyn Fn(ElementId, &Options, Arc<Sandbox>) -> anyhow::Result<Box<dyn Component>> + Send + Sync>;

/// Wrap a closure into a [`Factory`].
pub fn factory<F>(f: F) -> Factory
where
    F: Fn(ElementId, &Options, Arc<Sandbox>) -> anyhow::Result<Box<dyn Component>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}
