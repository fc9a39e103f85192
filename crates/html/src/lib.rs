//! In-memory HTML document tree: an arena-backed DOM
//! with structural mutation observation, selector queries, an html5ever
//! front end and markup/JSON serialization.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
#![allow(
    clippy::min_ident_chars,
    reason = "Short variable names acceptable in parsing context"
)]

pub mod dom;
pub mod parser;

pub use dom::{
    DOM, DOMNode, DomError, ElementRef, MutationRecord, NodeId, NodeKind, ObserverId, SharedDom,
};
pub use parser::{parse_document, parse_fragment_into};
