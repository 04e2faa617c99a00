//! The host document seam.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::selector::{Compound, Selector};

/// Opaque handle to one element of a [`Dom`].
///
/// Ids stay valid after the element is removed from the document; removal
/// only detaches it, so components bound to it can still be torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(usize);

impl ElementId {
    /// Create an id from a raw arena index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Read and annotate access to a host document.
///
/// Implementations must be usable behind `Arc<dyn Dom>`: every method takes
/// `&self`, mutation goes through interior mutability.
pub trait Dom: Send + Sync {
    /// The document root element.
    fn root(&self) -> ElementId;

    /// Lowercase tag name of an element, `None` for unknown ids.
    fn tag(&self, element: ElementId) -> Option<String>;

    /// Value of one attribute.
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// All attributes in declaration order.
    fn attributes(&self, element: ElementId) -> Vec<(String, String)>;

    /// Set (or overwrite) an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownElement`](crate::CoreError::UnknownElement)
    /// for ids that do not belong to this document.
    fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> CoreResult<()>;

    /// Direct children in document order.
    fn children(&self, element: ElementId) -> Vec<ElementId>;

    /// Parent element, `None` for the root and for detached subtrees.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Whether the element is currently reachable from the root.
    fn is_attached(&self, element: ElementId) -> bool {
        let root = self.root();
        let mut current = Some(element);
        while let Some(el) = current {
            if el == root {
                return true;
            }
            current = self.parent(el);
        }
        false
    }

    /// All descendants of `element` in document (pre-)order, excluding itself.
    fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(element).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }

    /// Whether `element` matches one of the selector's groups.
    fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        selector
            .groups()
            .iter()
            .any(|chain| matches_chain(self, element, chain))
    }

    /// Descendants of `scope` matching `selector`, in document order.
    fn select(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|el| self.matches(*el, selector))
            .collect()
    }

    /// `scope` itself (when it carries the attribute) followed by every
    /// descendant carrying `name`.
    fn with_attribute(&self, scope: ElementId, name: &str) -> Vec<ElementId> {
        let mut out = Vec::new();
        if self.attribute(scope, name).is_some() {
            out.push(scope);
        }
        out.extend(
            self.descendants(scope)
                .into_iter()
                .filter(|el| self.attribute(*el, name).is_some()),
        );
        out
    }
}

fn matches_compound<D: Dom + ?Sized>(dom: &D, element: ElementId, compound: &Compound) -> bool {
    if let Some(tag) = compound.tag() {
        match dom.tag(element) {
            Some(actual) if actual.eq_ignore_ascii_case(tag) => {},
            _ => return false,
        }
    } else if dom.tag(element).is_none() {
        return false;
    }

    if let Some(id) = compound.id()
        && dom.attribute(element, "id").as_deref() != Some(id)
    {
        return false;
    }

    if !compound.classes().is_empty() {
        let class_attr = dom.attribute(element, "class").unwrap_or_default();
        let present: Vec<&str> = class_attr.split_whitespace().collect();
        if !compound.classes().iter().all(|c| present.contains(&c.as_str())) {
            return false;
        }
    }

    compound.attributes().iter().all(|m| {
        match (dom.attribute(element, m.name()), m.value()) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        }
    })
}

/// Match a descendant-combinator chain right to left.
fn matches_chain<D: Dom + ?Sized>(dom: &D, element: ElementId, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !matches_compound(dom, element, last) {
        return false;
    }

    let mut remaining = ancestors;
    let mut current = dom.parent(element);
    while let Some((wanted, rest)) = remaining.split_last() {
        let Some(el) = current else {
            return false;
        };
        if matches_compound(dom, el, wanted) {
            remaining = rest;
        }
        current = dom.parent(el);
    }
    true
}
