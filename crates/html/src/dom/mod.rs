//! Arena-backed document tree with DOM-style structural edits.
//!
//! Nodes are never freed: removal detaches a subtree so handles held by
//! callers stay valid and can be re-inserted later.

mod mutations;
mod printing;
mod query;

use indextree::Arena;
pub use indextree::NodeId;
use log::trace;
use mutations::ObserverRegistry;
pub use mutations::{MutationRecord, ObserverId};
pub use query::ElementRef;
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    /// `template` holds the inert content fragment of `<template>` elements.
    Element {
        tag: String,
        template: Option<NodeId>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
    /// Grouping container; inserting it moves its children instead.
    Fragment,
}

impl NodeKind {
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub const fn can_have_children(&self) -> bool {
        matches!(self, Self::Document | Self::Element { .. } | Self::Fragment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DOMNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
}

impl DOMNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} does not belong to this document")]
    Unknown(NodeId),
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),
    #[error("inserting {child:?} into {parent:?} would violate the tree hierarchy")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("node {reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },
}

/// Document handle shared between a host and the subsystems editing it.
pub type SharedDom = Arc<Mutex<DOM>>;

pub struct DOM {
    dom: Arena<DOMNode>,
    root: NodeId,
    observers: ObserverRegistry,
}

impl Default for DOM {
    fn default() -> Self {
        Self::new()
    }
}

impl DOM {
    pub fn new() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DOMNode::default()),
            dom,
            observers: ObserverRegistry::default(),
        }
    }

    pub fn into_shared(self) -> SharedDom {
        Arc::new(Mutex::new(self))
    }

    /// The document node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        self.dom
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DOMNode> {
        self.dom
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(NodeKind::is_element)
    }

    // -----------------------
    // Node factories
    // -----------------------

    /// Create a detached element. `<template>` elements get an empty content fragment.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let template = (tag == "template").then(|| self.create_fragment());
        self.dom
            .new_node(DOMNode::new(NodeKind::Element { tag, template }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.dom
            .new_node(DOMNode::new(NodeKind::Text { text: text.into() }))
    }

    /// Comment nodes double as non-rendering marker nodes.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.dom
            .new_node(DOMNode::new(NodeKind::Comment { text: text.into() }))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.dom.new_node(DOMNode::new(NodeKind::Fragment))
    }

    /// Deep-copy `node` out of another document into this one, detached.
    pub fn import_node(&mut self, source: &Self, node: NodeId) -> Option<NodeId> {
        let original = source.node(node)?;
        let kind = match &original.kind {
            NodeKind::Element { tag, template } => {
                let copied_template = template.and_then(|content| self.import_node(source, content));
                NodeKind::Element {
                    tag: tag.clone(),
                    template: copied_template,
                }
            }
            other => other.clone(),
        };
        let copy = self.dom.new_node(DOMNode {
            kind,
            attrs: original.attrs.clone(),
        });
        for child in source.children(node) {
            if let Some(child_copy) = self.import_node(source, child) {
                copy.append(child_copy, &mut self.dom);
            }
        }
        Some(copy)
    }

    // -----------------------
    // Attributes and data
    // -----------------------

    /// Set or replace an attribute. Names are ASCII-lowercased.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let Some(data) = self.node_mut(node) else {
            return;
        };
        if let Some(slot) = data.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            data.attrs.push((name, value));
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Character data of text and comment nodes.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Append to the character data of a text node; false if `node` is not text.
    pub fn append_text(&mut self, node: NodeId, extra: &str) -> bool {
        match self.node_mut(node).map(|data| &mut data.kind) {
            Some(NodeKind::Text { text }) => {
                text.push_str(extra);
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        node.descendants(&self.dom)
            .filter_map(|id| match self.kind(id) {
                Some(NodeKind::Text { text }) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Inert content fragment of a `<template>` element.
    pub fn template_content(&self, node: NodeId) -> Option<NodeId> {
        match self.kind(node)? {
            NodeKind::Element { template, .. } => *template,
            _ => None,
        }
    }

    // -----------------------
    // Navigation
    // -----------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.parent()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.first_child()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.last_child()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.previous_sibling()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.next_sibling()
    }

    /// Children in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.node(node).is_none() {
            return Vec::new();
        }
        node.children(&self.dom).collect()
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        self.first_child(node).is_some()
    }

    /// `node` followed by its descendants in pre-order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        if self.node(node).is_none() {
            return Vec::new();
        }
        node.descendants(&self.dom).collect()
    }

    pub fn previous_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    pub fn next_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        let first = self.first_child(node)?;
        if self.is_element(first) {
            Some(first)
        } else {
            self.next_sibling_element(first)
        }
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.node(node).is_some() && node.ancestors(&self.dom).any(|id| id == ancestor)
    }

    /// True when `node` is connected to the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<NodeId> {
        self.root
            .descendants(&self.dom)
            .find(|&id| self.tag_name(id) == Some("body"))
    }

    // -----------------------
    // Structural edits
    // -----------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or last when `reference` is None.
    /// A fragment `child` contributes its children, in order, and is left empty.
    ///
    /// # Errors
    /// Fails without touching the tree when the insertion would be invalid.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let moving = self.check_insertion(parent, child)?;
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, reference });
            }
        }
        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };
        let mut records = self.move_nodes(parent, &moving, reference)?;
        records.push(MutationRecord {
            target: parent,
            added: moving,
            removed: Vec::new(),
        });
        self.observers.deliver(&self.dom, &records);
        Ok(())
    }

    /// # Errors
    /// `NotAChild` when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                reference: child,
            });
        }
        child.detach(&mut self.dom);
        self.observers.deliver(
            &self.dom,
            &[MutationRecord {
                target: parent,
                added: Vec::new(),
                removed: vec![child],
            }],
        );
        Ok(())
    }

    /// Remove `node` from its parent, if it has one. Returns whether it was attached.
    pub fn detach(&mut self, node: NodeId) -> bool {
        self.parent(node)
            .is_some_and(|parent| self.remove_child(parent, node).is_ok())
    }

    /// Put `new_child` (or a fragment's children) where `old_child` was and detach `old_child`.
    ///
    /// # Errors
    /// Fails without touching the tree when `old_child` is not a child of
    /// `parent` or the insertion would be invalid.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(old_child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                reference: old_child,
            });
        }
        if new_child == old_child {
            return Ok(());
        }
        let moving = self.check_insertion(parent, new_child)?;
        let mut records = self.move_nodes(parent, &moving, Some(old_child))?;
        old_child.detach(&mut self.dom);
        records.push(MutationRecord {
            target: parent,
            added: moving,
            removed: vec![old_child],
        });
        self.observers.deliver(&self.dom, &records);
        Ok(())
    }

    /// Validate an insertion and return the nodes that will actually move.
    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<Vec<NodeId>, DomError> {
        let parent_kind = self.kind(parent).ok_or(DomError::Unknown(parent))?;
        let child_kind = self.kind(child).ok_or(DomError::Unknown(child))?;
        if !parent_kind.can_have_children() {
            return Err(DomError::NotAContainer(parent));
        }
        if *child_kind == NodeKind::Document || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(if *child_kind == NodeKind::Fragment {
            self.children(child)
        } else {
            vec![child]
        })
    }

    /// Detach `moving` from wherever it lives and splice it into `parent`.
    /// Returns the removal records for the old parents.
    fn move_nodes(
        &mut self,
        parent: NodeId,
        moving: &[NodeId],
        reference: Option<NodeId>,
    ) -> Result<Vec<MutationRecord>, DomError> {
        let mut records: Vec<MutationRecord> = Vec::new();
        for &node in moving {
            if let Some(old_parent) = self.parent(node) {
                match records.iter_mut().find(|record| record.target == old_parent) {
                    Some(record) => record.removed.push(node),
                    None => records.push(MutationRecord {
                        target: old_parent,
                        added: Vec::new(),
                        removed: vec![node],
                    }),
                }
            }
            node.detach(&mut self.dom);
        }
        for &node in moving {
            let inserted = match reference {
                Some(reference) => reference.checked_insert_before(node, &mut self.dom),
                None => parent.checked_append(node, &mut self.dom),
            };
            inserted.map_err(|_| DomError::HierarchyRequest {
                parent,
                child: node,
            })?;
        }
        trace!("moved {} node(s) into {parent:?}", moving.len());
        Ok(records)
    }

    // -----------------------
    // Mutation observation
    // -----------------------

    /// Observe child-list changes anywhere in the subtree rooted at `root`.
    /// Each structural edit delivers at most one batch to each observer.
    pub fn observe(
        &mut self,
        root: NodeId,
    ) -> (ObserverId, UnboundedReceiver<Vec<MutationRecord>>) {
        self.observers.observe(root)
    }

    /// Stop delivering to `id`. Returns false if it was already disconnected.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    /// Discard records for `id` until [`DOM::resume`] is called.
    pub fn suspend(&mut self, id: ObserverId) -> bool {
        self.observers.set_suspended(id, true)
    }

    pub fn resume(&mut self, id: ObserverId) -> bool {
        self.observers.set_suspended(id, false)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
