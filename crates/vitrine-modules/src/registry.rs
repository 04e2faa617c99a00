//! Module registry.
//!
//! Maps module names, as written in `data-module` attributes, to the
//! factory and option schema used to instantiate them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::component::Factory;
use crate::error::{ModuleError, ModuleResult};
use crate::schema::OptionSchema;

/// A registered module.
pub struct ModuleDescriptor {
    name: String,
    factory: Factory,
    schema: OptionSchema,
}

impl ModuleDescriptor {
    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Factory building instances.
    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Declared options and defaults.
    #[must_use]
    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Registry of module descriptors.
///
/// Entries are never removed or replaced once registered.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<ModuleDescriptor>>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::InvalidName`] for names that cannot appear in
    /// a space-separated activation attribute,
    /// [`ModuleError::InvalidDefault`] if the schema's defaults do not
    /// conform, and [`ModuleError::AlreadyRegistered`] if the name is taken.
    /// The existing entry is left untouched on error.
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: Factory,
        schema: OptionSchema,
    ) -> ModuleResult<()> {
        let name = name.into();
        validate_name(&name)?;
        schema.validate(&name)?;

        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        if modules.contains_key(&name) {
            return Err(ModuleError::AlreadyRegistered(name));
        }

        info!(module = %name, options = schema.len(), "Registered module");
        modules.insert(
            name.clone(),
            Arc::new(ModuleDescriptor {
                name,
                factory,
                schema,
            }),
        );
        Ok(())
    }

    /// Look up a module.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ModuleDescriptor>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Whether a module is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_name(name: &str) -> ModuleResult<()> {
    let invalid = |reason: &str| ModuleError::InvalidName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };
    if name.is_empty() {
        return Err(invalid("module name must not be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("module name must not contain whitespace"));
    }
    Ok(())
}
