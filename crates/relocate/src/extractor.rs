//! Picks the nodes a pass relocates out of the placeholder's current state.

use crate::error::{RelocateError, Result};
use html::{DOM, DomError, NodeId};
use log::trace;

/// Text of the marker comment inserted when the placeholder holds no content.
pub const MARKER_TEXT: &str = "relocated content will be inserted here";

/// Where the nodes of a [`ContentFragment`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Children of the inert content of the first `<template>` under the placeholder.
    Template,
    /// The placeholder's own children.
    Children,
    /// A freshly created marker comment.
    Marker,
}

/// Ordered nodes to relocate in one pass. Rebuilt every pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    pub source: ContentSource,
    pub nodes: Vec<NodeId>,
}

impl ContentFragment {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// False for anything [`extract`] returns.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Collect the content of `placeholder` without moving anything.
///
/// Template content takes priority when non-empty, then the placeholder's
/// children, then a detached marker comment so every pass leaves a trace.
///
/// # Errors
/// `Dom(Unknown)` when `placeholder` is not part of this document arena.
pub fn extract(dom: &mut DOM, placeholder: NodeId) -> Result<ContentFragment> {
    if dom.node(placeholder).is_none() {
        return Err(RelocateError::Dom(DomError::Unknown(placeholder)));
    }

    let template_nodes = dom
        .descendants(placeholder)
        .into_iter()
        .skip(1)
        .find(|&node| dom.tag_name(node) == Some("template"))
        .and_then(|template| dom.template_content(template))
        .map(|content| dom.children(content))
        .filter(|nodes| !nodes.is_empty());
    if let Some(nodes) = template_nodes {
        trace!("extracted {} template node(s) from {placeholder:?}", nodes.len());
        return Ok(ContentFragment {
            source: ContentSource::Template,
            nodes,
        });
    }

    let children = dom.children(placeholder);
    if !children.is_empty() {
        trace!("extracted {} child node(s) from {placeholder:?}", children.len());
        return Ok(ContentFragment {
            source: ContentSource::Children,
            nodes: children,
        });
    }

    trace!("{placeholder:?} is empty, extracting a marker");
    Ok(ContentFragment {
        source: ContentSource::Marker,
        nodes: vec![dom.create_comment(MARKER_TEXT)],
    })
}
