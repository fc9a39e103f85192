//! Selector queries over the document tree.

use super::{DOM, NodeId, NodeKind};
use core::fmt;
use css_selectors::{
    CssLocalName, CssString, NonTSPseudoClass, PseudoElement, SelectorImpl, SelectorList,
    matches_selector_list,
};
use html5ever::{Namespace, namespace_url, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{ElementSelectorFlags, MatchingContext};
use selectors::{Element, OpaqueElement};

/// An element of a borrowed [`DOM`], as seen by the selector engine.
#[derive(Clone, Copy)]
pub struct ElementRef<'dom> {
    dom: &'dom DOM,
    node: NodeId,
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl<'dom> ElementRef<'dom> {
    /// Wrap `node` if it is an element.
    pub fn new(dom: &'dom DOM, node: NodeId) -> Option<Self> {
        dom.is_element(node).then_some(Self { dom, node })
    }

    fn wrap(&self, node: Option<NodeId>) -> Option<Self> {
        node.and_then(|id| Self::new(self.dom, id))
    }

    fn tag(&self) -> &'dom str {
        self.dom.tag_name(self.node).unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<&'dom str> {
        self.dom.attr(self.node, name)
    }
}

#[allow(
    clippy::renamed_function_params,
    reason = "Parameter names follow this crate's vocabulary"
)]
impl Element for ElementRef<'_> {
    type Impl = SelectorImpl;

    fn opaque(&self) -> OpaqueElement {
        // The arena slot outlives every wrapper, unlike `self`.
        self.dom
            .node(self.node)
            .map_or_else(|| OpaqueElement::new(self.dom), OpaqueElement::new)
    }

    fn parent_element(&self) -> Option<Self> {
        self.wrap(self.dom.parent(self.node))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.wrap(self.dom.previous_sibling_element(self.node))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.wrap(self.dom.next_sibling_element(self.node))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.wrap(self.dom.first_element_child(self.node))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.tag() == local_name.as_str()
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        *namespace == ns!(html)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }

    fn attr_matches(
        &self,
        namespace: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // Attributes are stored without a namespace.
        let in_no_namespace = match *namespace {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific(url) => url.is_empty(),
        };
        in_no_namespace
            && self
                .attr(local_name.as_str())
                .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo_class: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, SelectorImpl>,
    ) -> bool {
        match *pseudo_class {}
    }

    fn match_pseudo_element(
        &self,
        pseudo_element: &PseudoElement,
        _context: &mut MatchingContext<'_, SelectorImpl>,
    ) -> bool {
        match *pseudo_element {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.tag(), "a" | "area" | "link") && self.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        self.tag() == "slot"
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.as_str().as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.as_str().as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    /// Comments don't count; any element or text child does.
    fn is_empty(&self) -> bool {
        !self.dom.children(self.node).into_iter().any(|child| {
            match self.dom.kind(child) {
                Some(NodeKind::Element { .. }) => true,
                Some(NodeKind::Text { text }) => !text.is_empty(),
                _ => false,
            }
        })
    }

    fn is_root(&self) -> bool {
        self.dom
            .parent(self.node)
            .is_some_and(|parent| matches!(self.dom.kind(parent), Some(NodeKind::Document)))
    }
}

impl DOM {
    /// First element under `scope` (excluding `scope`) matching `list`, in document order.
    /// Template contents are not part of the tree and are never matched.
    pub fn query_selector(&self, scope: NodeId, list: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .find(|&id| self.matches(id, list))
    }

    /// Every element under `scope` matching `list`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|&id| self.matches(id, list))
            .collect()
    }

    /// True when `node` is an element matching any selector in `list`.
    pub fn matches(&self, node: NodeId, list: &SelectorList) -> bool {
        ElementRef::new(self, node).is_some_and(|element| matches_selector_list(list, &element))
    }
}
