//! Handler and subscription identity types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Result returned by a handler.
pub type HandlerResult = anyhow::Result<()>;

/// A topic handler.
///
/// Handlers receive only the publisher-supplied arguments. The `Arc` is the
/// handler's identity: subscribing the same `Arc` twice to one topic keeps a
/// single delivery path, and passing it to `unsubscribe` removes exactly that
/// subscription.
pub type Handler = Arc<dyn Fn(&[Value]) -> HandlerResult + Send + Sync>;

/// Wrap a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Value]) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compare handler identities by data pointer.
pub(crate) fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Unique identifier for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered handler.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: Handler,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_identity_follows_arc() {
        let a = handler(|_| Ok(()));
        let b = handler(|_| Ok(()));
        let a2 = Arc::clone(&a);

        assert!(same_handler(&a, &a2));
        assert!(!same_handler(&a, &b));
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }
}
