//! HTML front end: html5ever tree construction into the arena [`DOM`].

mod sink;

use crate::dom::{DOM, DomError, NodeId};
use html5ever::ParseOpts;
use html5ever::tendril::TendrilSink as _;
use log::debug;
pub use sink::DomSink;

/// Parse a complete document. Malformed markup is recovered the way browsers do.
pub fn parse_document(markup: &str) -> DOM {
    let dom = html5ever::parse_document(DomSink::new(), ParseOpts::default()).one(markup);
    debug!("parsed document: {} bytes of markup", markup.len());
    dom
}

/// Parse `markup` as body content and append the resulting nodes to `parent`.
/// Returns the appended top-level nodes in order.
///
/// # Errors
/// Fails when `parent` cannot hold children.
pub fn parse_fragment_into(
    dom: &mut DOM,
    parent: NodeId,
    markup: &str,
) -> Result<Vec<NodeId>, DomError> {
    let parsed = parse_document(markup);
    let source = parsed.body().unwrap_or_else(|| parsed.root());
    let group = dom.create_fragment();
    let mut imported = Vec::new();
    for child in parsed.children(source) {
        if let Some(copy) = dom.import_node(&parsed, child) {
            dom.append_child(group, copy)?;
            imported.push(copy);
        }
    }
    dom.append_child(parent, group)?;
    Ok(imported)
}
