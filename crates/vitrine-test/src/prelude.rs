//! Prelude module - commonly used test utilities.
//!
//! Use `use vitrine_test::prelude::*;` to import all essential helpers.

pub use crate::{CATALOG_PAGE_URL, CatalogPage, catalog_page, pt_br_catalog, test_config};
pub use crate::{MockTransport, Notification, RecordingNavigator, RecordingNotifier};
pub use crate::{TestContext, setup_test_logging, setup_test_logging_default};
