//! Topic bus with deferred delivery.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{EventError, EventResult};
use crate::subscription::{Handler, Subscription, SubscriptionId, same_handler};

/// An event held back while the bus is queuing.
#[derive(Debug, Clone)]
struct QueuedEvent {
    topic: String,
    args: Vec<Value>,
}

#[derive(Debug, Default)]
struct BusState {
    /// Subscriptions per topic, in subscription order.
    topics: RwLock<HashMap<String, Vec<Subscription>>>,
    /// `Some` while queuing.
    queue: Mutex<Option<Vec<QueuedEvent>>>,
}

/// Publish/subscribe registry keyed by topic.
///
/// Clones share the same subscription table and queue, so every component
/// sandbox holding a clone sees one topic space.
///
/// No lock is held while handlers run: a handler may publish, subscribe or
/// unsubscribe (itself included) on the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<BusState>,
}

impl EventBus {
    /// Create an empty bus in the live (non-queuing) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `args` on `topic`.
    ///
    /// While queuing, the event is appended to the queue and nothing is
    /// delivered. Otherwise every handler currently subscribed to `topic`
    /// is invoked synchronously, in subscription order.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Handler`] with the first handler failure.
    /// Handlers after the failing one are not invoked.
    pub fn publish(&self, topic: &str, args: Vec<Value>) -> EventResult<()> {
        {
            let mut queue = self
                .state
                .queue
                .lock()
                .map_err(|e| EventError::LockPoisoned(e.to_string()))?;
            if let Some(pending) = queue.as_mut() {
                trace!(topic, queued = pending.len(), "Queuing event");
                pending.push(QueuedEvent {
                    topic: topic.to_owned(),
                    args,
                });
                return Ok(());
            }
        }

        let handlers: Vec<Handler> = {
            let topics = self
                .state
                .topics
                .read()
                .map_err(|e| EventError::LockPoisoned(e.to_string()))?;
            topics
                .get(topic)
                .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
                .unwrap_or_default()
        };

        trace!(topic, handlers = handlers.len(), "Publishing event");

        for handler in handlers {
            handler(&args).map_err(|e| EventError::Handler {
                topic: topic.to_owned(),
                source: e.into(),
            })?;
        }
        Ok(())
    }

    /// Subscribe `handler` to `topic`.
    ///
    /// Subscribing a handler that is already subscribed to the topic returns
    /// the existing id and does not add a second delivery path.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        let topic = topic.into();
        let mut topics = self
            .state
            .topics
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let subs = topics.entry(topic).or_default();

        if let Some(existing) = subs.iter().find(|s| same_handler(&s.handler, &handler)) {
            return existing.id;
        }

        let id = SubscriptionId::new();
        subs.push(Subscription { id, handler });
        id
    }

    /// Subscribe several handlers at once.
    pub fn subscribe_all<I, T>(&self, handlers: I) -> Vec<SubscriptionId>
    where
        I: IntoIterator<Item = (T, Handler)>,
        T: Into<String>,
    {
        handlers
            .into_iter()
            .map(|(topic, handler)| self.subscribe(topic, handler))
            .collect()
    }

    /// Remove subscriptions from `topic`.
    ///
    /// With `Some(handler)` only that handler is removed; with `None` every
    /// subscription to the topic is removed. Returns how many were removed.
    pub fn unsubscribe(&self, topic: &str, handler: Option<&Handler>) -> usize {
        let mut topics = self
            .state
            .topics
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let removed = match (topics.get_mut(topic), handler) {
            (None, _) => 0,
            (Some(subs), None) => subs.len(),
            (Some(subs), Some(target)) => {
                let before = subs.len();
                subs.retain(|s| !same_handler(&s.handler, target));
                before.saturating_sub(subs.len())
            },
        };

        if topics.get(topic).is_some_and(|subs| handler.is_none() || subs.is_empty()) {
            topics.remove(topic);
        }

        if removed > 0 {
            debug!(topic, removed, "Unsubscribed handlers");
        }
        removed
    }

    /// Remove one subscription by id. Returns whether it existed.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        let mut topics = self
            .state
            .topics
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut emptied = None;
        let mut found = false;
        for (topic, subs) in topics.iter_mut() {
            if let Some(pos) = subs.iter().position(|s| s.id == id) {
                subs.remove(pos);
                found = true;
                if subs.is_empty() {
                    emptied = Some(topic.clone());
                }
                break;
            }
        }
        if let Some(topic) = emptied {
            topics.remove(&topic);
        }
        found
    }

    /// Start queuing published events. Idempotent.
    pub fn enqueue(&self) {
        let mut queue = self.state.queue.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.is_none() {
            debug!("Event bus queuing");
            *queue = Some(Vec::new());
        }
    }

    /// Stop queuing and replay queued events in publish order.
    ///
    /// The bus is live again before the first replay, so events published by
    /// handlers during the flush are delivered immediately, ahead of the
    /// queued events that remain. Calling this while not queuing is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure. The remaining queued events are
    /// dropped.
    pub fn dequeue(&self) -> EventResult<()> {
        let pending = {
            let mut queue = self
                .state
                .queue
                .lock()
                .map_err(|e| EventError::LockPoisoned(e.to_string()))?;
            queue.take()
        };

        let Some(events) = pending else {
            return Ok(());
        };

        debug!(count = events.len(), "Flushing queued events");
        for event in events {
            self.publish(&event.topic, event.args)?;
        }
        Ok(())
    }

    /// Whether the bus is currently queuing.
    #[must_use]
    pub fn is_queuing(&self) -> bool {
        self.state
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of events waiting in the queue.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.state
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// Number of handlers subscribed to `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Whether the subscription is still registered.
    #[must_use]
    pub fn contains_subscription(&self, id: SubscriptionId) -> bool {
        self.state
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|subs| subs.iter().any(|s| s.id == id))
    }

    /// Topics with at least one subscriber, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .state
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        topics.sort();
        topics
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.topics())
            .field("queuing", &self.is_queuing())
            .finish()
    }
}
