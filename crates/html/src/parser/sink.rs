//! html5ever tree sink that builds directly into a [`DOM`] arena.

use crate::dom::{DOM, NodeId};
use core::cell::RefCell;
use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, ExpandedName, QualName, local_name, namespace_url, ns};
use log::{trace, warn};
use std::borrow::Cow;
use std::rc::Rc;

/// Parser-side handle: the arena id plus the qualified name html5ever asks about.
#[derive(Debug)]
pub struct SinkNode {
    id: NodeId,
    name: QualName,
}

pub type Handle = Rc<SinkNode>;

/// Builds a [`DOM`] while html5ever runs its tree construction.
pub struct DomSink {
    dom: RefCell<DOM>,
}

impl Default for DomSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(DOM::new()),
        }
    }

    fn handle(id: NodeId) -> Handle {
        Rc::new(SinkNode {
            id,
            name: QualName::new(None, ns!(), local_name!("")),
        })
    }

    fn append_node(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let result = self.dom.borrow_mut().insert_before(parent, child, reference);
        if let Err(err) = result {
            warn!("html parser: dropped node {child:?}: {err}");
        }
    }

    /// Merge `text` into the text node at `neighbour`, or insert a new one.
    fn insert_text(
        &self,
        parent: NodeId,
        neighbour: Option<NodeId>,
        reference: Option<NodeId>,
        text: &str,
    ) {
        let merged = neighbour.is_some_and(|node| self.dom.borrow_mut().append_text(node, text));
        if merged {
            return;
        }
        let node = self.dom.borrow_mut().create_text(text);
        self.append_node(parent, node, reference);
    }
}

impl TreeSink for DomSink {
    type Handle = Handle;
    type Output = DOM;
    type ElemName<'sink> = ExpandedName<'sink>;

    fn finish(self) -> Self::Output {
        self.dom.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        Self::handle(self.dom.borrow().root())
    }

    fn elem_name<'sink>(&'sink self, target: &'sink Self::Handle) -> ExpandedName<'sink> {
        target.name.expanded()
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let mut dom = self.dom.borrow_mut();
        let id = dom.create_element(name.local.as_ref());
        for attr in attrs {
            dom.set_attribute(id, attr.name.local.as_ref(), attr.value.to_string());
        }
        Rc::new(SinkNode { id, name })
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Self::handle(self.dom.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        // Appending an empty fragment leaves the tree untouched.
        Self::handle(self.dom.borrow_mut().create_fragment())
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.append_node(parent.id, node.id, None),
            NodeOrText::AppendText(text) => {
                let last = self.dom.borrow().last_child(parent.id);
                self.insert_text(parent.id, last, None, &text);
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.dom.borrow().parent(element.id).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Doctypes carry nothing the document model keeps.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        let content = self.dom.borrow().template_content(target.id);
        Self::handle(content.unwrap_or(target.id))
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let parent = self.dom.borrow().parent(sibling.id);
        let Some(parent) = parent else {
            return;
        };
        match new_node {
            NodeOrText::AppendNode(node) => self.append_node(parent, node.id, Some(sibling.id)),
            NodeOrText::AppendText(text) => {
                let previous = self.dom.borrow().previous_sibling(sibling.id);
                self.insert_text(parent, previous, Some(sibling.id), &text);
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            if dom.attr(target.id, attr.name.local.as_ref()).is_none() {
                dom.set_attribute(target.id, attr.name.local.as_ref(), attr.value.to_string());
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = self.dom.borrow().children(node.id);
        for child in children {
            self.append_node(new_parent.id, child, None);
        }
    }
}
