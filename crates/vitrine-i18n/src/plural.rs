//! Plural form selection.

use tracing::debug;

/// Rule mapping a count to a plural form index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PluralRule {
    /// `plural=(n != 1)`: English and most Germanic languages.
    #[default]
    NotOne,
    /// `plural=(n > 1)`: French, Brazilian Portuguese.
    GreaterThanOne,
    /// `nplurals=1; plural=0`: languages without plural inflection.
    Invariant,
}

impl PluralRule {
    /// Derive the rule from a `plural_forms` header such as
    /// `nplurals=2; plural=(n != 1);`.
    ///
    /// Unrecognised expressions fall back to [`PluralRule::NotOne`].
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let compact: String = header.chars().filter(|c| !c.is_whitespace()).collect();
        let expr = compact
            .split(';')
            .find_map(|part| part.strip_prefix("plural="))
            .unwrap_or_default()
            .trim_start_matches('(')
            .trim_end_matches(')');

        match expr {
            "n!=1" => Self::NotOne,
            "n>1" => Self::GreaterThanOne,
            "0" => Self::Invariant,
            other => {
                debug!(expression = other, "unsupported plural expression, using n != 1");
                Self::NotOne
            },
        }
    }

    /// Form index for `count`.
    #[must_use]
    pub fn index(self, count: u64) -> usize {
        match self {
            Self::NotOne => usize::from(count != 1),
            Self::GreaterThanOne => usize::from(count > 1),
            Self::Invariant => 0,
        }
    }
}
