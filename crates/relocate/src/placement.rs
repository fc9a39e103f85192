//! The five structural edits that move a [`ContentFragment`] next to or into an anchor.

use crate::error::{RelocateError, Result};
use crate::extractor::ContentFragment;
use core::fmt;
use core::str::FromStr;
use html::{DOM, DomError, NodeId};
use log::debug;
use serde::{Deserialize, Serialize};

/// Where content goes relative to the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlacementMode {
    /// Into the anchor's parent, immediately before the anchor.
    #[default]
    Before,
    /// Appended as the last children of the anchor's parent.
    After,
    /// Prepended inside the anchor.
    Start,
    /// Appended inside the anchor.
    End,
    /// In place of the anchor, which is detached. Spelled `self`.
    Replace,
}

impl PlacementMode {
    pub const ALL: [Self; 5] = [
        Self::Before,
        Self::After,
        Self::Start,
        Self::End,
        Self::Replace,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Start => "start",
            Self::End => "end",
            Self::Replace => "self",
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementMode {
    type Err = RelocateError;

    /// Exact, case-sensitive match on `before`, `after`, `start`, `end` and `self`.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| RelocateError::InvalidPlacementMode(s.to_owned()))
    }
}

impl TryFrom<String> for PlacementMode {
    type Error = RelocateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PlacementMode> for String {
    fn from(mode: PlacementMode) -> Self {
        mode.as_str().to_owned()
    }
}

/// Move `content` to the position `mode` names relative to `anchor`.
///
/// All checks run before the first write: a failed call leaves the tree as
/// it was. The nodes are gathered into one grouping fragment and spliced in
/// with a single structural edit, so they land as one contiguous run.
///
/// # Errors
/// `DetachedAnchor` when `anchor` has no parent, `Dom(HierarchyRequest)` when a
/// content node contains the anchor.
pub fn place(
    dom: &mut DOM,
    mode: PlacementMode,
    anchor: NodeId,
    content: &ContentFragment,
) -> Result<()> {
    let parent = dom
        .parent(anchor)
        .ok_or(RelocateError::DetachedAnchor { anchor })?;
    for &node in &content.nodes {
        if dom.node(node).is_none() {
            return Err(DomError::Unknown(node).into());
        }
        if dom.is_inclusive_ancestor(node, anchor) {
            return Err(DomError::HierarchyRequest {
                parent: anchor,
                child: node,
            }
            .into());
        }
    }

    let group = dom.create_fragment();
    for &node in &content.nodes {
        dom.append_child(group, node)?;
    }
    match mode {
        PlacementMode::Before => dom.insert_before(parent, group, Some(anchor))?,
        PlacementMode::After => dom.append_child(parent, group)?,
        PlacementMode::Start => {
            let first = dom.first_child(anchor);
            dom.insert_before(anchor, group, first)?;
        }
        PlacementMode::End => dom.append_child(anchor, group)?,
        PlacementMode::Replace => dom.replace_child(parent, group, anchor)?,
    }
    debug!(
        "placed {} node(s) {mode} {anchor:?}",
        content.nodes.len()
    );
    Ok(())
}
