use html::{DOM, DomError, NodeId};

fn element(dom: &mut DOM, parent: NodeId, tag: &str) -> NodeId {
    let node = dom.create_element(tag);
    dom.append_child(parent, node).unwrap();
    node
}

#[test]
fn insert_before_orders_children_and_lowercases_tags() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let div = element(&mut dom, root, "DIV");
    let a = element(&mut dom, div, "a");
    let b = element(&mut dom, div, "b");
    let c = dom.create_element("i");
    dom.insert_before(div, c, Some(b)).unwrap();

    assert_eq!(dom.tag_name(div), Some("div"));
    assert_eq!(dom.children(div), vec![a, c, b]);
    assert_eq!(dom.outer_html(div), "<div><a></a><i></i><b></b></div>");
}

#[test]
fn fragment_insertion_moves_children_and_empties_the_fragment() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let div = element(&mut dom, root, "div");
    let existing = element(&mut dom, div, "span");
    let group = dom.create_fragment();
    let first = element(&mut dom, group, "a");
    let text = dom.create_text("t");
    dom.append_child(group, text).unwrap();

    dom.insert_before(div, group, Some(existing)).unwrap();

    assert_eq!(dom.children(div), vec![first, text, existing]);
    assert!(!dom.has_children(group));
    assert_eq!(dom.parent(group), None);
    assert_eq!(dom.inner_html(div), "<a></a>t<span></span>");
}

#[test]
fn rejected_insertions_leave_the_tree_untouched() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let outer = element(&mut dom, root, "div");
    let inner = element(&mut dom, outer, "p");
    let text = dom.create_text("x");
    dom.append_child(inner, text).unwrap();
    let stranger = dom.create_element("b");
    let before = dom.outer_html(root);

    assert_eq!(
        dom.append_child(inner, outer),
        Err(DomError::HierarchyRequest {
            parent: inner,
            child: outer
        })
    );
    assert_eq!(
        dom.append_child(text, stranger),
        Err(DomError::NotAContainer(text))
    );
    assert_eq!(
        dom.insert_before(outer, stranger, Some(text)),
        Err(DomError::NotAChild {
            parent: outer,
            reference: text
        })
    );
    assert_eq!(
        dom.append_child(outer, root),
        Err(DomError::HierarchyRequest {
            parent: outer,
            child: root
        })
    );
    assert_eq!(dom.outer_html(root), before);
    assert_eq!(dom.parent(stranger), None);
}

#[test]
fn replace_child_splices_a_fragment_in_place() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let div = element(&mut dom, root, "div");
    element(&mut dom, div, "a");
    let old = element(&mut dom, div, "b");
    element(&mut dom, div, "c");
    let group = dom.create_fragment();
    element(&mut dom, group, "x");
    element(&mut dom, group, "y");

    dom.replace_child(div, group, old).unwrap();

    assert_eq!(dom.inner_html(div), "<a></a><x></x><y></y><c></c>");
    assert_eq!(dom.parent(old), None);
    assert!(!dom.is_connected(old));
}

#[test]
fn detached_nodes_keep_their_subtree_and_can_return() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let div = element(&mut dom, root, "div");
    let section = element(&mut dom, div, "section");
    let leaf = element(&mut dom, section, "em");

    assert!(dom.detach(section));
    assert!(!dom.detach(section));
    assert!(!dom.is_connected(leaf));
    assert_eq!(dom.parent(leaf), Some(section));

    dom.append_child(div, section).unwrap();
    assert!(dom.is_connected(leaf));
    assert_eq!(dom.inner_html(div), "<section><em></em></section>");
}

#[test]
fn attributes_are_replaced_and_read_case_insensitively() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let div = element(&mut dom, root, "div");
    dom.set_attribute(div, "Data-Kind", "one");
    dom.set_attribute(div, "data-kind", "two \"quoted\" & more");

    assert_eq!(dom.attr(div, "DATA-KIND"), Some("two \"quoted\" & more"));
    assert_eq!(
        dom.outer_html(div),
        "<div data-kind=\"two &quot;quoted&quot; &amp; more\"></div>"
    );
}

#[test]
fn template_elements_own_an_inert_content_fragment() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DOM::new();
    let root = dom.root();
    let template = element(&mut dom, root, "template");
    let content = dom.template_content(template).unwrap();
    element(&mut dom, content, "b");

    assert!(!dom.has_children(template));
    assert_eq!(dom.inner_html(template), "<b></b>");
    assert_eq!(dom.outer_html(template), "<template><b></b></template>");
}
