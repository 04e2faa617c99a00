//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only apply to fields that
//! no config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `VITRINE_*` mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "VITRINE_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "VITRINE_LOG_FORMAT",
        field_path: "logging.format",
    },
    EnvMapping {
        var_name: "VITRINE_LOCALE",
        field_path: "i18n.locale",
    },
    EnvMapping {
        var_name: "VITRINE_I18N_CATALOG",
        field_path: "i18n.catalog_path",
    },
    EnvMapping {
        var_name: "VITRINE_HTTP_BASE_URL",
        field_path: "http.base_url",
    },
    EnvMapping {
        var_name: "VITRINE_HTTP_TIMEOUT_SECS",
        field_path: "http.timeout_secs",
    },
    EnvMapping {
        var_name: "VITRINE_CSRF_TOKEN",
        field_path: "http.csrf_token",
    },
    EnvMapping {
        var_name: "VITRINE_FILTER_PARAM",
        field_path: "filters.param",
    },
];

/// Apply environment variable fallbacks to fields that were **not** set by
/// any config file layer. Fields set only by the embedded defaults count as
/// unset.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            set_field_from_string(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a field in the TOML tree from a string value, creating intermediate
/// tables as needed.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let toml_val = coerce_to_toml_value(path, val);
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), toml_val);
    }
}

/// Coerce a string env var value to the TOML type of its field.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if path == "http.timeout_secs"
        && let Ok(i) = val.parse::<i64>()
    {
        return toml::Value::Integer(i);
    }

    toml::Value::String(val.to_owned())
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_apply_env_fallbacks() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"info\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::Defaults);
        let env = make_env(&[
            ("VITRINE_LOG_LEVEL", "debug"),
            ("VITRINE_HTTP_TIMEOUT_SECS", "5"),
            ("UNRELATED", "x"),
        ]);

        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);
        assert_eq!(count, 2);
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(merged["http"]["timeout_secs"].as_integer(), Some(5));
        assert_eq!(sources["http.timeout_secs"], ConfigLayer::Environment);
    }

    #[test]
    fn test_env_fallback_skips_file_values() {
        let mut merged: toml::Value = toml::from_str("[filters]\nparam = \"f\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("filters.param".to_owned(), ConfigLayer::User);
        let env = make_env(&[("VITRINE_FILTER_PARAM", "q")]);

        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 0);
        assert_eq!(merged["filters"]["param"].as_str(), Some("f"));
    }

    #[test]
    fn test_unparsable_integer_stays_string() {
        assert_eq!(
            coerce_to_toml_value("http.timeout_secs", "soon"),
            toml::Value::String("soon".to_owned())
        );
        assert_eq!(coerce_to_toml_value("i18n.locale", "pt_BR").as_str(), Some("pt_BR"));
    }
}
