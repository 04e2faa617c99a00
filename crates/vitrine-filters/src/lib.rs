//! Vitrine Filters - URL-backed filter state shared by independent widgets.
//!
//! Filter widgets never share in-memory state. The active filters live in
//! one query parameter of the page URL (`filters=field:value|field:value`),
//! every change computes the next URL and navigates to it, and the next page
//! load reads the state back.
//!
//! This crate provides:
//! - [`FilterState`]: the field → values mapping with its pure
//!   [`parse`](FilterState::parse) / [`encode`](FilterState::encode) pair
//! - [`FilterStore`]: the state of the current page plus `set` / `unset` /
//!   `set_and_redirect_to`
//! - The [`Navigator`] seam and [`RecordingNavigator`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_filters::{FilterStore, RecordingNavigator};
//!
//! let navigator = Arc::new(RecordingNavigator::new());
//! let store = FilterStore::from_url(
//!     "https://catalog.example.org/dataset?filters=country:Brazil",
//!     navigator.clone(),
//! )
//! .unwrap();
//!
//! let next = store.set("country", ["Brazil", "Chile"]).unwrap();
//! assert_eq!(navigator.last(), Some(next));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod navigator;
mod state;
mod store;

pub use error::{FilterError, FilterResult};
pub use navigator::{Navigator, RecordingNavigator};
pub use state::{DEFAULT_FILTER_PARAM, FilterState, FilterValues};
pub use store::{FilterStore, with_filters};
