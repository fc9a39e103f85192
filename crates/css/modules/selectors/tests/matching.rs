//! Selector matching against a small hand-built element tree.

use core::fmt;
use css_selectors::{
    CssLocalName, CssString, NonTSPseudoClass, PseudoElement, SelectorImpl,
    matches_selector_list, parse_selector_list,
};
use html5ever::{Namespace, ns, namespace_url};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{ElementSelectorFlags, MatchingContext};
use selectors::{Element, OpaqueElement};

struct El {
    tag: &'static str,
    parent: Option<usize>,
    attrs: Vec<(&'static str, &'static str)>,
}

/// Flat element list; siblings are the elements sharing a parent, in index order.
struct Tree {
    nodes: Vec<El>,
}

#[derive(Clone, Copy)]
struct Node<'tree> {
    tree: &'tree Tree,
    index: usize,
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Node").field(&self.index).finish()
    }
}

impl<'tree> Node<'tree> {
    fn at(&self, index: usize) -> Self {
        Self {
            tree: self.tree,
            index,
        }
    }

    fn el(&self) -> &'tree El {
        &self.tree.nodes[self.index]
    }

    fn attr(&self, name: &str) -> Option<&'tree str> {
        self.el()
            .attrs
            .iter()
            .find(|(attr_name, _)| *attr_name == name)
            .map(|(_, value)| *value)
    }

    fn siblings(&self) -> impl Iterator<Item = usize> + 'tree {
        let parent = self.el().parent;
        let tree = self.tree;
        (0..tree.nodes.len()).filter(move |&idx| tree.nodes[idx].parent == parent)
    }
}

impl Element for Node<'_> {
    type Impl = SelectorImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.el())
    }

    fn parent_element(&self) -> Option<Self> {
        self.el().parent.map(|parent| self.at(parent))
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
        self.siblings()
            .take_while(|&idx| idx < self.index)
            .last()
            .map(|idx| self.at(idx))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.siblings()
            .find(|&idx| idx > self.index)
            .map(|idx| self.at(idx))
    }

    fn first_element_child(&self) -> Option<Self> {
        (0..self.tree.nodes.len())
            .find(|&idx| self.tree.nodes[idx].parent == Some(self.index))
            .map(|idx| self.at(idx))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.el().tag == local_name.as_str()
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        *namespace == ns!(html)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.el().tag == other.el().tag
    }

    fn attr_matches(
        &self,
        namespace: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
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
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.as_str().as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|token| case_sensitivity.eq(token.as_bytes(), name.as_str().as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.first_element_child().is_none()
    }

    fn is_root(&self) -> bool {
        self.el().parent.is_none()
    }
}

/// <div id=outer class="wrap big">
///   <p>
///     <section>
///       <span id=a/>
///     </section>
///   </p>
///   <em/>
///   <b data-kind=primary lang=en-GB/>
///   <i/>
/// </div>
fn fixture() -> Tree {
    Tree {
        nodes: vec![
            El { tag: "div", parent: None, attrs: vec![("id", "outer"), ("class", "wrap big")] },
            El { tag: "p", parent: Some(0), attrs: vec![] },
            El { tag: "section", parent: Some(1), attrs: vec![] },
            El { tag: "span", parent: Some(2), attrs: vec![("id", "a")] },
            El { tag: "em", parent: Some(0), attrs: vec![] },
            El { tag: "b", parent: Some(0), attrs: vec![("data-kind", "primary"), ("lang", "en-GB")] },
            El { tag: "i", parent: Some(0), attrs: vec![("id", "x:y")] },
        ],
    }
}

fn matches(tree: &Tree, index: usize, selector: &str) -> bool {
    let list = parse_selector_list(selector).unwrap();
    matches_selector_list(&list, &Node { tree, index })
}

#[test]
fn simple_selectors() {
    let tree = fixture();
    assert!(matches(&tree, 0, "div"));
    assert!(matches(&tree, 0, "#outer"));
    assert!(matches(&tree, 0, ".big.wrap"));
    assert!(!matches(&tree, 0, ".missing"));
    assert!(matches(&tree, 5, "[data-kind]"));
    assert!(matches(&tree, 5, "[data-kind=primary]"));
    assert!(!matches(&tree, 5, "[data-kind='secondary']"));
    assert!(matches(&tree, 6, "*"));
}

#[test]
fn ids_and_classes_are_case_sensitive() {
    let tree = fixture();
    assert!(!matches(&tree, 0, "#OUTER"));
    assert!(!matches(&tree, 0, ".WRAP"));
    assert!(matches(&tree, 0, "DIV"));
}

#[test]
fn combinators_relate_the_right_compounds() {
    let tree = fixture();
    assert!(matches(&tree, 3, "div span"));
    assert!(matches(&tree, 3, "section > span"));
    assert!(!matches(&tree, 3, "div > span"));
    assert!(matches(&tree, 3, "div p > section span#a"));
    assert!(matches(&tree, 5, "em + b"));
    assert!(!matches(&tree, 6, "em + i"));
    assert!(matches(&tree, 6, "p ~ i"));
    assert!(matches(&tree, 6, "#outer > em ~ i"));
}

#[test]
fn descendant_matching_backtracks() {
    let tree = fixture();
    // The nearest `section` ancestor has no `div` parent, but an outer ancestor does.
    assert!(matches(&tree, 3, "div > p section span"));
    assert!(!matches(&tree, 3, "section > p span"));
}

#[test]
fn any_selector_in_a_group_matches() {
    let tree = fixture();
    assert!(matches(&tree, 4, ".nope, em"));
    assert!(!matches(&tree, 4, ".nope, i"));
}

#[test]
fn attribute_operators() {
    let tree = fixture();
    assert!(matches(&tree, 5, "[data-kind^=pri]"));
    assert!(matches(&tree, 5, "[data-kind$=ary]"));
    assert!(matches(&tree, 5, "[data-kind*=ima]"));
    assert!(!matches(&tree, 5, "[data-kind^='']"));
    assert!(matches(&tree, 5, "[lang|=en]"));
    assert!(!matches(&tree, 5, "[lang|=GB]"));
    assert!(matches(&tree, 0, "[class~=big]"));
    assert!(!matches(&tree, 0, "[class~=bi]"));
    assert!(matches(&tree, 5, "[data-kind=PRIMARY i]"));
}

#[test]
fn tree_structural_pseudo_classes() {
    let tree = fixture();
    assert!(matches(&tree, 1, "p:first-child"));
    assert!(!matches(&tree, 4, "em:first-child"));
    assert!(matches(&tree, 6, "i:last-child"));
    assert!(matches(&tree, 5, "b:nth-child(3)"));
    assert!(matches(&tree, 4, ":nth-child(2n)"));
    assert!(matches(&tree, 3, "span:only-child"));
    assert!(matches(&tree, 3, "span:empty"));
    assert!(matches(&tree, 0, ":root"));
    assert!(!matches(&tree, 1, ":root"));
}

#[test]
fn negation_and_escapes() {
    let tree = fixture();
    assert!(matches(&tree, 4, "em:not(.y)"));
    assert!(!matches(&tree, 0, "div:not(.wrap)"));
    assert!(matches(&tree, 5, ":not(p, em, i)"));
    assert!(matches(&tree, 6, "#x\\:y"));
    assert!(matches(&tree, 6, "#nope, #x\\:y"));
}
