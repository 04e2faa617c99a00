//! Arena-backed in-memory document.

use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::dom::{Dom, ElementId};
use crate::error::{CoreError, CoreResult};

/// Declarative description of an element subtree to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    /// Start describing an element with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
        self
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Append a class to the `class` attribute.
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        let class = class.into();
        let existing = self
            .attributes
            .iter()
            .find(|(n, _)| n == "class")
            .map(|(_, v)| v.clone());
        match existing {
            Some(current) if !current.is_empty() => self.attr("class", format!("{current} {class}")),
            _ => self.attr("class", class),
        }
    }

    /// Append a child element.
    #[must_use]
    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A document held entirely in memory.
///
/// Elements live in an arena and are never deallocated: [`remove`] only
/// detaches a subtree, so ids held by component instances stay valid until
/// the instances are reaped.
///
/// [`remove`]: MemoryDocument::remove
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: RwLock<Vec<Node>>,
}

impl MemoryDocument {
    /// Create a document containing only an `html` root element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(vec![Node {
                tag: "html".to_owned(),
                attributes: Vec::new(),
                parent: None,
                children: Vec::new(),
            }]),
        }
    }

    /// Insert a subtree as the last child of `parent`, returning the id of
    /// the subtree's top element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownElement`] if `parent` is not part of this
    /// document.
    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> CoreResult<ElementId> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        if parent.index() >= nodes.len() {
            return Err(CoreError::UnknownElement(parent));
        }
        let id = insert_spec(&mut nodes, parent, spec);
        trace!(%parent, element = %id, "appended subtree");
        Ok(id)
    }

    /// Detach an element (and its subtree) from its parent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownElement`] for foreign ids.
    pub fn remove(&self, element: ElementId) -> CoreResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        let parent = nodes
            .get_mut(element.index())
            .ok_or(CoreError::UnknownElement(element))?
            .parent
            .take();
        if let Some(parent) = parent
            && let Some(node) = nodes.get_mut(parent.index())
        {
            node.children.retain(|c| *c != element);
        }
        trace!(%element, "detached element");
        Ok(())
    }

    /// Re-attach a detached element as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownElement`] for foreign ids and
    /// [`CoreError::Cycle`] if `parent` lies inside `element`'s subtree.
    pub fn attach(&self, parent: ElementId, element: ElementId) -> CoreResult<()> {
        if self.descendants(element).contains(&parent) || parent == element {
            return Err(CoreError::Cycle {
                child: element,
                parent,
            });
        }
        self.remove(element)?;
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        if parent.index() >= nodes.len() {
            return Err(CoreError::UnknownElement(parent));
        }
        if let Some(node) = nodes.get_mut(element.index()) {
            node.parent = Some(parent);
        }
        if let Some(node) = nodes.get_mut(parent.index()) {
            node.children.push(element);
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let node = nodes.get_mut(element.index())?;
        let pos = node.attributes.iter().position(|(n, _)| n == name)?;
        Some(node.attributes.remove(pos).1)
    }

    /// Total number of elements ever created, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the document holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_spec(nodes: &mut Vec<Node>, parent: ElementId, spec: ElementSpec) -> ElementId {
    let id = ElementId::from_index(nodes.len());
    nodes.push(Node {
        tag: spec.tag,
        attributes: spec.attributes,
        parent: Some(parent),
        children: Vec::new(),
    });
    if let Some(p) = nodes.get_mut(parent.index()) {
        p.children.push(id);
    }
    for child in spec.children {
        insert_spec(nodes, id, child);
    }
    id
}

impl Dom for MemoryDocument {
    fn root(&self) -> ElementId {
        ElementId::from_index(0)
    }

    fn tag(&self, element: ElementId) -> Option<String> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes.get(element.index()).map(|n| n.tag.clone())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes
            .get(element.index())?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn attributes(&self, element: ElementId) -> Vec<(String, String)> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes
            .get(element.index())
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> CoreResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        let node = nodes
            .get_mut(element.index())
            .ok_or(CoreError::UnknownElement(element))?;
        if let Some(slot) = node.attributes.iter_mut().find(|(n, _)| n == name) {
            value.clone_into(&mut slot.1);
        } else {
            node.attributes.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes
            .get(element.index())
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes.get(element.index())?.parent
    }
}
