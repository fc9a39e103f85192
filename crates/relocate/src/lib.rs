//! Selector-driven content relocation.
//!
//! A placeholder's content is moved next to, into, or in place of the element
//! a selector names, and moved again whenever the placeholder's content
//! changes. The pieces, in pass order:
//! - [`resolver`] finds the anchor element,
//! - [`extractor`] picks the placeholder's current content,
//! - [`placement`] performs one of five structural edits,
//! - [`watcher`] turns mutations into debounced re-runs,
//! - [`orchestrator`] ties them into the `Idle → Active → TornDown` lifecycle.

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
    reason = "Formatter and parser parameters keep their std names"
)]

pub mod config;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod host;
pub mod orchestrator;
pub mod placement;
pub mod resolver;
pub mod watcher;

pub use config::{RelocateConfig, RelocationOptions};
pub use error::{RelocateError, Result};
pub use extractor::{ContentFragment, ContentSource, extract};
pub use frame::FrameScheduler;
pub use host::{CollectingErrorSink, Environment, ErrorSink, LogErrorSink};
pub use orchestrator::{ContentRelocator, LifecycleState, Placed};
pub use placement::{PlacementMode, place};
pub use resolver::resolve;
pub use watcher::{ChangeCallback, ChangeWatcher, Debouncer};
