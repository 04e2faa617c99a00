//! Vitrine Core - Document model and shared types for the Vitrine component core.
//!
//! This crate provides:
//! - The [`Dom`] trait, the seam between the component core and the host
//!   document (selection, attributes, attachment)
//! - [`MemoryDocument`], an arena-backed implementation used by tests and
//!   headless hosts
//! - A small CSS-style [`Selector`] language for scoped queries
//!
//! # Example
//!
//! ```rust
//! use vitrine_core::{Dom, ElementSpec, MemoryDocument, Selector};
//!
//! let doc = MemoryDocument::new();
//! let form = doc
//!     .append(
//!         doc.root(),
//!         ElementSpec::new("form")
//!             .attr("data-module", "search-form")
//!             .child(ElementSpec::new("input").class("search")),
//!     )
//!     .unwrap();
//!
//! let selector = Selector::parse("input.search").unwrap();
//! assert_eq!(doc.select(form, &selector).len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod document;
mod dom;
mod error;
mod selector;

pub use document::{ElementSpec, MemoryDocument};
pub use dom::{Dom, ElementId};
pub use error::{CoreError, CoreResult};
pub use selector::{AttributeMatch, Compound, Selector};
