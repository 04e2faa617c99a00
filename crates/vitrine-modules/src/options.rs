//! Option extraction from element attributes.

use serde_json::Value;
use tracing::warn;

use vitrine_core::{Dom, ElementId};
use vitrine_sandbox::Options;

use crate::schema::OptionSchema;

/// Read the options of `element` declared as `<prefix>-<key>` attributes.
///
/// Keys are converted from kebab-case to camelCase (`data-module-show-more`
/// becomes `showMore`). Declared options are parsed with their kind; a value
/// that does not parse is logged and the default is kept. Undeclared options
/// are read as JSON, falling back to the raw string. The result is the
/// schema defaults shallow-merged with the element's values.
#[must_use]
pub fn extract_options(
    dom: &dyn Dom,
    element: ElementId,
    prefix: &str,
    schema: &OptionSchema,
) -> Options {
    let mut options = schema.defaults();
    let attr_prefix = format!("{prefix}-");

    for (name, raw) in dom.attributes(element) {
        let Some(suffix) = name.strip_prefix(&attr_prefix) else {
            continue;
        };
        if suffix.is_empty() {
            continue;
        }
        let key = camel_case(suffix);

        let value = match schema.get(&key) {
            Some(spec) => match spec.kind.parse(&raw) {
                Ok(value) => value,
                Err(reason) => {
                    warn!(%element, attribute = %name, %reason, "ignoring malformed module option");
                    continue;
                },
            },
            None => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        };
        options.insert(key, value);
    }

    options
}

/// Convert hyphenated keys to camelCase. Only a hyphen followed by an ASCII
/// lowercase letter is folded; underscores, digits and other hyphens stay.
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '-' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            },
            _ => out.push(c),
        }
    }
    out
}
