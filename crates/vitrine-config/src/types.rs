//! Configuration types.
//!
//! Every section implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Activation attribute names.
    pub activation: ActivationSection,
    /// Filter store settings.
    pub filters: FiltersSection,
    /// Translation catalog settings.
    pub i18n: I18nSection,
    /// AJAX transport settings.
    pub http: HttpSection,
    /// Logging level, format and target.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// ActivationSection
// ---------------------------------------------------------------------------

/// Attributes the activator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSection {
    /// Attribute naming the modules of an element (`data-module`).
    pub module_attribute: String,
    /// Prefix of option attributes (`data-module` gives
    /// `data-module-<key>`).
    pub option_prefix: String,
}

impl Default for ActivationSection {
    fn default() -> Self {
        Self {
            module_attribute: "data-module".to_owned(),
            option_prefix: "data-module".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// FiltersSection
// ---------------------------------------------------------------------------

/// Filter store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    /// Query parameter holding the encoded filters.
    pub param: String,
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            param: "filters".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// I18nSection
// ---------------------------------------------------------------------------

/// Translation catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nSection {
    /// Locale reported by the catalog.
    pub locale: String,
    /// Default message domain.
    pub domain: String,
    /// JSON catalog loaded at startup. `None` starts with an empty catalog
    /// (every key translates to itself).
    pub catalog_path: Option<String>,
}

impl Default for I18nSection {
    fn default() -> Self {
        Self {
            locale: "en".to_owned(),
            domain: "vitrine".to_owned(),
            catalog_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSection
// ---------------------------------------------------------------------------

/// AJAX transport settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Base URL relative request URLs are resolved against.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Header carrying the CSRF token.
    pub csrf_header: String,
    /// CSRF token sent with every request. Prefer `VITRINE_CSRF_TOKEN` over
    /// storing this in a file.
    pub csrf_token: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            csrf_header: "X-CSRF-Token".to_owned(),
            csrf_token: None,
        }
    }
}

impl std::fmt::Debug for HttpSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSection")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("csrf_header", &self.csrf_header)
            .field("has_csrf_token", &self.csrf_token.is_some())
            .finish()
    }
}

impl Serialize for HttpSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HttpSection", 3)?;
        if let Some(base_url) = &self.base_url {
            state.serialize_field("base_url", base_url)?;
        } else {
            state.skip_field("base_url")?;
        }
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.serialize_field("csrf_header", &self.csrf_header)?;
        // csrf_token is never written out.
        state.end()
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// `"stdout"`, `"stderr"` or `"file"`.
    pub target: String,
    /// Log directory when `target = "file"`.
    pub directory: Option<String>,
    /// Per-crate directives (e.g. `["vitrine_modules=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            target: "stderr".to_owned(),
            directory: None,
            directives: Vec::new(),
        }
    }
}
