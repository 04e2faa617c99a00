//! Minimal CSS-style selectors for scoped queries.
//!
//! Supported grammar: comma-separated groups of compound selectors joined by
//! the descendant combinator (whitespace). A compound is an optional tag name
//! or `*`, followed by any number of `#id`, `.class`, `[attr]` and
//! `[attr=value]` (value optionally single- or double-quoted).

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// One `[name]` or `[name=value]` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    name: String,
    value: Option<String>,
}

impl AttributeMatch {
    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required value, `None` for a presence test.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A compound selector: every condition must hold for the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    /// Required tag name, `None` for any element.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Required `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Required classes.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Attribute conditions.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeMatch] {
        &self.attributes
    }
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<Compound>>,
}

impl Selector {
    /// Parse a selector.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSelector`] for empty input, empty groups,
    /// unterminated attribute brackets or unexpected characters.
    pub fn parse(source: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidSelector {
            selector: source.to_owned(),
            reason: reason.to_owned(),
        };

        if source.trim().is_empty() {
            return Err(invalid("empty selector"));
        }

        let mut groups = Vec::new();
        for group in source.split(',') {
            let chain = group
                .split_whitespace()
                .map(|part| parse_compound(part).map_err(|reason| invalid(&reason)))
                .collect::<CoreResult<Vec<_>>>()?;
            if chain.is_empty() {
                return Err(invalid("empty selector group"));
            }
            groups.push(chain);
        }

        Ok(Self {
            source: source.to_owned(),
            groups,
        })
    }

    /// Selector groups; each group is a descendant chain, outermost first.
    #[must_use]
    pub fn groups(&self) -> &[Vec<Compound>] {
        &self.groups
    }

    /// The source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos = pos.saturating_add(1);
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0usize;

    if chars.first() == Some(&'*') {
        pos = 1;
    } else {
        let (tag, next) = take_ident(&chars, 0);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        pos = pos.max(next);
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                let (id, next) = take_ident(&chars, pos.saturating_add(1));
                if id.is_empty() {
                    return Err("expected id after '#'".to_owned());
                }
                compound.id = Some(id);
                pos = next;
            },
            '.' => {
                let (class, next) = take_ident(&chars, pos.saturating_add(1));
                if class.is_empty() {
                    return Err("expected class name after '.'".to_owned());
                }
                compound.classes.push(class);
                pos = next;
            },
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .ok_or_else(|| "unterminated attribute selector".to_owned())?;
                let end = pos.saturating_add(close);
                let body: String = chars[pos.saturating_add(1)..end].iter().collect();
                compound.attributes.push(parse_attribute(&body)?);
                pos = end.saturating_add(1);
            },
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(compound)
}

fn parse_attribute(body: &str) -> Result<AttributeMatch, String> {
    let (name, value) = match body.split_once('=') {
        Some((name, raw)) => {
            let raw = raw.trim();
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
                .unwrap_or(raw);
            (name.trim(), Some(unquoted.to_owned()))
        },
        None => (body.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("invalid attribute name '{name}'"));
    }

    Ok(AttributeMatch {
        name: name.to_owned(),
        value,
    })
}
