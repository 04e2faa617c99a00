//! Vitrine I18n - Translation catalog consumed by component sandboxes.
//!
//! Catalogs use the domain-keyed JSON layout produced by the usual gettext
//! to JSON converters:
//!
//! ```json
//! {
//!   "domain": "vitrine",
//!   "locale_data": {
//!     "vitrine": {
//!       "": { "domain": "vitrine", "lang": "pt_BR", "plural_forms": "nplurals=2; plural=(n > 1);" },
//!       "Remove": [null, "Remover"],
//!       "%(num)s dataset": ["%(num)s datasets", "%(num)s conjunto", "%(num)s conjuntos"]
//!     }
//!   }
//! }
//! ```
//!
//! The first element of a multi-element entry is the plural id (`null` or
//! the untranslated plural) and is skipped.
//!
//! Lookups never fail: a missing entry yields the untranslated key, with
//! `%(name)s` placeholders substituted either way.
//!
//! # Example
//!
//! ```rust
//! use vitrine_i18n::Catalog;
//!
//! let catalog = Catalog::new();
//! catalog
//!     .load_str(r#"{"domain":"vitrine","locale_data":{"vitrine":{"Hello %(name)s":[null,"Olá %(name)s"]}}}"#)
//!     .unwrap();
//! assert_eq!(catalog.translate("Hello %(name)s", &[("name", "Ana")]), "Olá Ana");
//! assert_eq!(catalog.translate("Untranslated", &[]), "Untranslated");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod catalog;
mod error;
mod format;
mod plural;

pub use catalog::{Catalog, DEFAULT_DOMAIN};
pub use error::{I18nError, I18nResult};
pub use format::interpolate;
pub use plural::PluralRule;
