//! CSS selector parsing and matching on top of the `selectors` and `cssparser` crates.
//! Reference: <https://www.w3.org/TR/selectors-4/>
//!
//! Selector strings accept the full syntax the `selectors` crate understands:
//! compound and complex selectors, every combinator, attribute operators,
//! CSS escapes and the tree-structural pseudo-classes (`:first-child`,
//! `:nth-child()`, `:not()`, `:is()`, ...). Pseudo-classes that depend on user
//! interaction or document state are rejected as syntax errors.
//!
//! A DOM opts in by implementing [`selectors::Element`] with
//! `Impl = SelectorImpl`.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Selector plumbing types are documented at the crate level"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

mod matcher;
mod parser;
mod selector_impl;

use core::fmt;
use selectors::parser::SelectorList as ParsedList;
use thiserror::Error;

pub use matcher::matches_selector_list;
pub use parser::{SelectorParser, parse_selector_list};
pub use selector_impl::{CssLocalName, CssString, NonTSPseudoClass, PseudoElement, SelectorImpl};

/// A parsed, comma-separated group of selectors.
pub struct SelectorList {
    /// Source text, kept for diagnostics.
    text: String,
    parsed: ParsedList<SelectorImpl>,
}

impl SelectorList {
    /// The selector text this list was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of selectors in the group.
    pub fn len(&self) -> usize {
        self.parsed.0.len()
    }

    /// A parsed list always holds at least one selector.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for SelectorList {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SelectorList").field(&self.text).finish()
    }
}

/// Reasons a selector string is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    /// `offset` is a byte offset into the selector text.
    #[error("`{opener}` at offset {offset} is never closed")]
    Unclosed { opener: char, offset: usize },
    /// Line and column are one-based.
    #[error("invalid selector at line {line}, column {column}: {reason}")]
    Invalid {
        reason: String,
        line: u32,
        column: u32,
    },
}
