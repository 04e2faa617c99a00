//! Vitrine Test - Shared test utilities for the Vitrine workspace.
//!
//! Mocks for the external seams (transport, notifier, navigator), a catalog
//! search page fixture, and logging/tempdir helpers. Meant as a
//! dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! vitrine-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_test::{MockTransport, catalog_page};
//!
//! #[tokio::test]
//! async fn test_search_form() {
//!     let page = catalog_page();
//!     let transport = Arc::new(MockTransport::new().with_response(200, "{}"));
//!     // build an Application with .transport(transport.clone()) ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
