//! `%(name)s` placeholder substitution.

/// Substitute `%(name)s` / `%(name)d` placeholders.
///
/// `%%` renders a literal `%`. Placeholders without a matching value are left
/// untouched.
#[must_use]
pub fn interpolate(template: &str, placeholders: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
            continue;
        }

        let substituted = tail.strip_prefix("%(").and_then(|inner| {
            let close = inner.find(')')?;
            let name = &inner[..close];
            let after = &inner[close.saturating_add(1)..];
            let after = after.strip_prefix('s').or_else(|| after.strip_prefix('d'))?;
            let value = placeholders.iter().find(|(k, _)| *k == name)?.1;
            Some((value, after))
        });

        if let Some((value, after)) = substituted {
            out.push_str(value);
            rest = after;
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
