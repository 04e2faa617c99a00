//! Domain-keyed translation tables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{I18nError, I18nResult};
use crate::format::interpolate;
use crate::plural::PluralRule;

/// Domain used when a catalog does not name one.
pub const DEFAULT_DOMAIN: &str = "messages";

#[derive(Debug, Default)]
struct Domain {
    rule: PluralRule,
    messages: HashMap<String, Vec<String>>,
}

#[derive(Debug)]
struct CatalogState {
    default_domain: String,
    locale: Option<String>,
    domains: HashMap<String, Domain>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            default_domain: DEFAULT_DOMAIN.to_owned(),
            locale: None,
            domains: HashMap::new(),
        }
    }
}

/// Shared translation catalog.
///
/// Clones share state: a catalog loaded after sandboxes were created is
/// visible to all of them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    state: Arc<RwLock<CatalogState>>,
}

impl Catalog {
    /// Create an empty catalog. Every lookup returns its key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog for `locale` with `domain` as the default
    /// domain. A loaded catalog header or `domain` key replaces either.
    #[must_use]
    pub fn with_locale(locale: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                default_domain: domain.into(),
                locale: Some(locale.into()),
                domains: HashMap::new(),
            })),
        }
    }

    /// Merge a catalog from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::Parse`] for invalid JSON and
    /// [`I18nError::InvalidCatalog`] for an unexpected layout.
    pub fn load_str(&self, json: &str) -> I18nResult<()> {
        let value: Value = serde_json::from_str(json)?;
        self.load(&value)
    }

    /// Merge a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::Read`] if the file cannot be read, otherwise the
    /// errors of [`Catalog::load_str`].
    pub fn load_file(&self, path: &Path) -> I18nResult<()> {
        let json = std::fs::read_to_string(path).map_err(|source| I18nError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.load_str(&json)
    }

    /// Merge a parsed catalog.
    ///
    /// Entries are merged into existing domains; later loads win for keys
    /// present in both. The catalog's `domain` becomes the default domain.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidCatalog`] if `locale_data` is missing or
    /// a domain is not an object.
    pub fn load(&self, catalog: &Value) -> I18nResult<()> {
        let locale_data = catalog
            .get("locale_data")
            .and_then(Value::as_object)
            .ok_or_else(|| I18nError::InvalidCatalog("missing 'locale_data' object".to_owned()))?;

        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        for (domain_name, entries) in locale_data {
            let entries = entries.as_object().ok_or_else(|| {
                I18nError::InvalidCatalog(format!("domain '{domain_name}' is not an object"))
            })?;
            let domain = state.domains.entry(domain_name.clone()).or_default();
            let mut loaded = 0usize;

            for (key, forms) in entries {
                if key.is_empty() {
                    if let Some(header) = forms.get("plural_forms").and_then(Value::as_str) {
                        domain.rule = PluralRule::from_header(header);
                    }
                    if let Some(lang) = forms.get("lang").and_then(Value::as_str) {
                        state_locale(&mut state.locale, lang);
                    }
                    continue;
                }
                if let Some(forms) = parse_forms(forms) {
                    domain.messages.insert(key.clone(), forms);
                    loaded = loaded.saturating_add(1);
                }
            }
            debug!(domain = %domain_name, entries = loaded, "loaded catalog domain");
        }

        if let Some(domain) = catalog.get("domain").and_then(Value::as_str) {
            domain.clone_into(&mut state.default_domain);
        }
        info!(
            default_domain = %state.default_domain,
            locale = state.locale.as_deref().unwrap_or("unknown"),
            "translation catalog loaded"
        );
        Ok(())
    }

    /// Locale announced by the most recent catalog header.
    #[must_use]
    pub fn locale(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .locale
            .clone()
    }

    /// Whether the default domain has an entry for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .domains
            .get(&state.default_domain)
            .is_some_and(|d| d.messages.contains_key(key))
    }

    /// Translate `key`, substituting placeholders.
    #[must_use]
    pub fn translate(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        let template = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state
                .domains
                .get(&state.default_domain)
                .and_then(|d| d.messages.get(key))
                .and_then(|forms| forms.first())
                .filter(|s| !s.is_empty())
                .cloned()
        };
        interpolate(template.as_deref().unwrap_or(key), placeholders)
    }

    /// Translate a message with plural forms.
    ///
    /// The `num` placeholder is filled with `count` unless the caller
    /// supplies it. Without a catalog entry, `singular` is used for a count
    /// of one and `plural` otherwise.
    #[must_use]
    pub fn translate_plural(
        &self,
        singular: &str,
        plural: &str,
        count: u64,
        placeholders: &[(&str, &str)],
    ) -> String {
        let template = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state.domains.get(&state.default_domain).and_then(|d| {
                let forms = d.messages.get(singular)?;
                let index = d.rule.index(count).min(forms.len().saturating_sub(1));
                forms.get(index).filter(|s| !s.is_empty()).cloned()
            })
        };
        let template = template.unwrap_or_else(|| {
            if count == 1 { singular } else { plural }.to_owned()
        });

        let count_text = count.to_string();
        let mut values: Vec<(&str, &str)> = placeholders.to_vec();
        if !values.iter().any(|(k, _)| *k == "num") {
            values.push(("num", count_text.as_str()));
        }
        interpolate(&template, &values)
    }
}

fn state_locale(slot: &mut Option<String>, lang: &str) {
    if !lang.is_empty() {
        *slot = Some(lang.to_owned());
    }
}

/// Accept `[plural_id, "form", ...]`, where the plural id is `null` or the
/// untranslated plural, and a bare `["form"]`.
fn parse_forms(value: &Value) -> Option<Vec<String>> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::String(s) => return Some(vec![s.clone()]),
        _ => return None,
    };
    let items = match items {
        [_, rest @ ..] if !rest.is_empty() => rest,
        _ => items,
    };
    let forms: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(ToOwned::to_owned))
        .collect();
    (!forms.is_empty()).then_some(forms)
}
