//! Vitrine Events - Synchronous topic bus for cross-component coordination.
//!
//! This crate provides:
//! - [`EventBus`], a publish/subscribe registry keyed by topic string
//! - A queuing mode that defers delivery until [`EventBus::dequeue`]
//! - [`Handler`], the shared callback type whose `Arc` identity is used for
//!   precise unsubscription
//!
//! # Delivery model
//!
//! Publishing is synchronous: every handler subscribed to the topic runs to
//! completion, in subscription order, before `publish` returns. Handler
//! errors are not isolated; the first failure stops delivery and is returned
//! to the publisher.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use vitrine_events::{EventBus, handler};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! bus.subscribe("dataset:selected", handler(move |args| {
//!     sink.lock().unwrap().push(args.to_vec());
//!     Ok(())
//! }));
//!
//! bus.publish("dataset:selected", vec![json!("census-2020")]).unwrap();
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod error;
mod subscription;

pub use bus::EventBus;
pub use error::{EventError, EventResult};
pub use subscription::{Handler, HandlerResult, SubscriptionId, handler};
