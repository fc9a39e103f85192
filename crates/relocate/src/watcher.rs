//! Mutation-driven rescheduling with a cancel-and-restart debounce timer.

use crate::error::{RelocateError, Result};
use core::time::Duration;
use html::{DOM, NodeId, ObserverId, SharedDom};
use log::{debug, trace};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Callback a [`ChangeWatcher`] runs once a burst of mutations has gone quiet.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Last-write-wins timer: scheduling cancels whatever was pending, so at most
/// one callback is ever waiting.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Run `callback` after `delay` unless rescheduled or cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            callback();
        }));
    }

    /// Drop the pending callback. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some_and(|handle| {
            let waiting = !handle.is_finished();
            handle.abort();
            waiting
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Observes child-list changes anywhere under a root and calls back, debounced.
///
/// Every batch restarts the timer no matter what it contains, so a burst of
/// edits produces a single callback. The watcher cannot tell its owner's own
/// writes from anyone else's; owners suspend it around their writes.
pub struct ChangeWatcher {
    dom: SharedDom,
    observer: ObserverId,
    task: Option<JoinHandle<()>>,
    debouncer: Arc<Mutex<Debouncer>>,
}

impl ChangeWatcher {
    /// Start observing `root`. `interval` is read each time a batch arrives,
    /// so debounce changes take effect on the next mutation.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// `Poisoned` if the document lock is poisoned.
    pub fn start<I>(
        dom: &SharedDom,
        root: NodeId,
        interval: I,
        on_change: ChangeCallback,
    ) -> Result<Self>
    where
        I: Fn() -> Duration + Send + 'static,
    {
        let (observer, mut batches) = dom
            .lock()
            .map_err(|_| RelocateError::Poisoned)?
            .observe(root);
        let debouncer = Arc::new(Mutex::new(Debouncer::default()));
        let task_debouncer = Arc::clone(&debouncer);
        let task = tokio::spawn(async move {
            while let Some(batch) = batches.recv().await {
                trace!("observer {observer:?}: {} mutation record(s)", batch.len());
                let callback = Arc::clone(&on_change);
                let Ok(mut debouncer) = task_debouncer.lock() else {
                    break;
                };
                debouncer.schedule(interval(), move || callback());
            }
        });
        debug!("watching {root:?} as {observer:?}");
        Ok(Self {
            dom: Arc::clone(dom),
            observer,
            task: Some(task),
            debouncer,
        })
    }

    /// True while a debounced callback is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.debouncer
            .lock()
            .is_ok_and(|debouncer| debouncer.is_pending())
    }

    /// Discard mutations made through `dom` until [`ChangeWatcher::resume`].
    /// Takes the already-locked document so writers can bracket their edits.
    pub fn suspend(&self, dom: &mut DOM) -> bool {
        dom.suspend(self.observer)
    }

    pub fn resume(&self, dom: &mut DOM) -> bool {
        dom.resume(self.observer)
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stop observing and cancel any pending callback. Idempotent.
    /// Locks the document: do not call while holding its lock.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        if let Ok(mut debouncer) = self.debouncer.lock() {
            debouncer.cancel();
        }
        if let Ok(mut dom) = self.dom.lock() {
            dom.disconnect(self.observer);
        }
        debug!("stopped watching as {:?}", self.observer);
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
