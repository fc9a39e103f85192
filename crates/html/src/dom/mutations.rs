//! Structural mutation observation: child-list changes, delivered per edit in
//! batches to every observer whose root contains the mutated parent.

use super::DOMNode;
use indextree::{Arena, NodeId};
use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// One child-list change of `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

struct Registration {
    id: ObserverId,
    root: NodeId,
    sender: UnboundedSender<Vec<MutationRecord>>,
    suspended: bool,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl ObserverRegistry {
    pub(crate) fn observe(
        &mut self,
        root: NodeId,
    ) -> (ObserverId, UnboundedReceiver<Vec<MutationRecord>>) {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.registrations.push(Registration {
            id,
            root,
            sender,
            suspended: false,
        });
        (id, receiver)
    }

    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations
            .retain(|registration| registration.id != id);
        self.registrations.len() != before
    }

    pub(crate) fn set_suspended(&mut self, id: ObserverId, suspended: bool) -> bool {
        self.registrations
            .iter_mut()
            .find(|registration| registration.id == id)
            .map(|registration| registration.suspended = suspended)
            .is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Send each observer the records whose target lies in its subtree.
    /// Observers whose receiver is gone are dropped.
    pub(crate) fn deliver(&mut self, arena: &Arena<DOMNode>, records: &[MutationRecord]) {
        if records.is_empty() {
            return;
        }
        self.registrations.retain(|registration| {
            if registration.suspended {
                return true;
            }
            let batch: Vec<MutationRecord> = records
                .iter()
                .filter(|record| {
                    record
                        .target
                        .ancestors(arena)
                        .any(|ancestor| ancestor == registration.root)
                })
                .cloned()
                .collect();
            if batch.is_empty() {
                return true;
            }
            if registration.sender.send(batch).is_err() {
                debug!("dropping observer {:?}: receiver closed", registration.id);
                return false;
            }
            true
        });
    }
}
