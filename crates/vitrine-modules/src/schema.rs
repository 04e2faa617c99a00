//! Typed option declarations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use vitrine_sandbox::Options;

use crate::error::{ModuleError, ModuleResult};

/// The declared type of a module option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// `true` / `false`; a bare attribute means `true`.
    Bool,
    /// A signed 64-bit integer.
    Integer,
    /// A finite floating point number.
    Float,
    /// The attribute text, unparsed.
    String,
    /// A JSON array, or a comma-separated list of strings.
    List,
    /// A JSON object.
    Object,
    /// Any JSON value.
    Json,
}

impl OptionKind {
    /// Whether `value` is acceptable for this kind. `null` is accepted by
    /// every kind and means "no default".
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (Self::Json, _) => true,
            (Self::Bool, v) => v.is_boolean(),
            (Self::Integer, v) => v.is_i64(),
            (Self::Float, v) => v.is_number(),
            (Self::String, v) => v.is_string(),
            (Self::List, v) => v.is_array(),
            (Self::Object, v) => v.is_object(),
        }
    }

    /// Parse attribute text as this kind.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch when `raw` cannot be read as
    /// this kind.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        let text = raw.trim();
        match self {
            Self::Bool => match text.to_ascii_lowercase().as_str() {
                "" | "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("expected true or false, got '{raw}'")),
            },
            Self::Integer => text
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("expected an integer, got '{raw}': {e}")),
            Self::Float => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("expected a finite number, got '{raw}'")),
            Self::String => Ok(Value::String(raw.to_owned())),
            Self::List => {
                if text.starts_with('[') {
                    match serde_json::from_str::<Value>(text) {
                        Ok(list @ Value::Array(_)) => Ok(list),
                        _ => Err(format!("expected a JSON array, got '{raw}'")),
                    }
                } else if text.is_empty() {
                    Ok(Value::Array(Vec::new()))
                } else {
                    Ok(Value::Array(
                        text.split(',')
                            .map(|item| Value::String(item.trim().to_owned()))
                            .collect(),
                    ))
                }
            },
            Self::Object => match serde_json::from_str::<Value>(text) {
                Ok(object @ Value::Object(_)) => Ok(object),
                _ => Err(format!("expected a JSON object, got '{raw}'")),
            },
            Self::Json => serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}")),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Declared kind.
    pub kind: OptionKind,
    /// Value used when the element does not override it.
    pub default: Value,
}

/// Declared options of a module, in declaration order.
///
/// ```rust
/// use serde_json::json;
/// use vitrine_modules::{OptionKind, OptionSchema};
///
/// let schema = OptionSchema::new()
///     .option("limit", OptionKind::Integer, json!(10))
///     .option("showMore", OptionKind::Bool, json!(false));
/// assert_eq!(schema.defaults().get_i64("limit"), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    options: Vec<(String, OptionSpec)>,
}

impl OptionSchema {
    /// An empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) an option. Names are camelCase, as produced
    /// from `data-module-*` attributes.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, kind: OptionKind, default: impl Into<Value>) -> Self {
        let name = name.into();
        let spec = OptionSpec {
            kind,
            default: default.into(),
        };
        if let Some(slot) = self.options.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = spec;
        } else {
            self.options.push((name, spec));
        }
        self
    }

    /// The declaration for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Iterate declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionSpec)> {
        self.options.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    /// Number of declared options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The default values as an option mapping.
    #[must_use]
    pub fn defaults(&self) -> Options {
        self.options
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default.clone()))
            .collect()
    }

    /// Check every default against its declared kind.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::InvalidDefault`] for the first default that
    /// does not conform.
    pub fn validate(&self, module: &str) -> ModuleResult<()> {
        for (name, spec) in &self.options {
            if !spec.kind.accepts(&spec.default) {
                return Err(ModuleError::InvalidDefault {
                    module: module.to_owned(),
                    option: name.clone(),
                    expected: spec.kind,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_parsing() {
        assert_eq!(OptionKind::Bool.parse("true"), Ok(json!(true)));
        assert_eq!(OptionKind::Bool.parse("FALSE"), Ok(json!(false)));
        assert_eq!(OptionKind::Bool.parse(""), Ok(json!(true)));
        assert!(OptionKind::Bool.parse("yes").is_err());
    }

    #[test]
    fn test_numeric_parsing() {
        assert_eq!(OptionKind::Integer.parse(" 42 "), Ok(json!(42)));
        assert!(OptionKind::Integer.parse("4.2").is_err());
        assert_eq!(OptionKind::Float.parse("0.25"), Ok(json!(0.25)));
        assert!(OptionKind::Float.parse("NaN").is_err());
        assert!(OptionKind::Float.parse("many").is_err());
    }

    #[test]
    fn test_list_parsing() {
        assert_eq!(OptionKind::List.parse("[1, 2]"), Ok(json!([1, 2])));
        assert_eq!(OptionKind::List.parse("tags, groups"), Ok(json!(["tags", "groups"])));
        assert_eq!(OptionKind::List.parse(""), Ok(json!([])));
        assert!(OptionKind::List.parse("[1,").is_err());
    }

    #[test]
    fn test_object_and_json_parsing() {
        assert_eq!(OptionKind::Object.parse(r#"{"a": 1}"#), Ok(json!({"a": 1})));
        assert!(OptionKind::Object.parse("[1]").is_err());
        assert_eq!(OptionKind::Json.parse("null"), Ok(Value::Null));
        assert!(OptionKind::Json.parse("not json").is_err());
        assert_eq!(OptionKind::String.parse(" keep spaces "), Ok(json!(" keep spaces ")));
    }

    #[test]
    fn test_accepts_null_for_every_kind() {
        for kind in [
            OptionKind::Bool,
            OptionKind::Integer,
            OptionKind::Float,
            OptionKind::String,
            OptionKind::List,
            OptionKind::Object,
            OptionKind::Json,
        ] {
            assert!(kind.accepts(&Value::Null), "{kind}");
        }
        assert!(OptionKind::Float.accepts(&json!(3)));
        assert!(!OptionKind::Integer.accepts(&json!(3.5)));
    }

    #[test]
    fn test_redeclaring_replaces_in_place() {
        let schema = OptionSchema::new()
            .option("a", OptionKind::Integer, 1)
            .option("b", OptionKind::String, "x")
            .option("a", OptionKind::Integer, 2);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.iter().next().map(|(n, _)| n), Some("a"));
        assert_eq!(schema.defaults().get_i64("a"), Some(2));
    }

    #[test]
    fn test_validate_rejects_nonconforming_default() {
        let schema = OptionSchema::new().option("limit", OptionKind::Integer, "ten");
        let err = schema.validate("facet-list").unwrap_err();
        assert!(matches!(
            err,
            ModuleError::InvalidDefault { ref option, expected: OptionKind::Integer, .. } if option == "limit"
        ));
        assert!(OptionSchema::new().option("limit", OptionKind::Integer, 10).validate("x").is_ok());
    }
}
