//! Failure kinds of a placement pass. Each one aborts only the pass it occurs in.

use css_selectors::SelectorError;
use html::{DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocateError {
    /// The selector string is not valid selector syntax.
    #[error("`{selector}` is not a valid selector: {source}")]
    SelectorSyntax {
        selector: String,
        #[source]
        source: SelectorError,
    },
    /// The selector is valid but matched nothing when the pass ran.
    #[error("no element matches `{selector}`")]
    TargetNotFound { selector: String },
    /// The anchor has no parent node, so nothing can be placed relative to it.
    #[error("anchor {anchor:?} has no parent node")]
    DetachedAnchor { anchor: NodeId },
    #[error("`{0}` is not a placement mode (expected before, after, start, end or self)")]
    InvalidPlacementMode(String),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("document lock poisoned by a panicking writer")]
    Poisoned,
}

pub type Result<T, E = RelocateError> = core::result::Result<T, E>;
