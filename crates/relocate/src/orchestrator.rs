//! Lifecycle of one placeholder: `Idle → Active → TornDown`.

use crate::config::RelocationOptions;
use crate::error::{RelocateError, Result};
use crate::extractor::extract;
use crate::frame::FrameScheduler;
use crate::host::{Environment, ErrorSink};
use crate::placement::place;
use crate::resolver::resolve;
use crate::watcher::{ChangeCallback, ChangeWatcher};
use core::sync::atomic::{AtomicU64, Ordering};
use html::{NodeId, SharedDom};
use log::{debug, info, trace, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};

const PLACED_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, or mounted in a non-interactive environment.
    Idle,
    /// Placed once and watching the placeholder for changes.
    Active,
    /// Watching stopped; no further passes run.
    TornDown,
}

/// Completion notification: one per successful placement pass, no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed;

/// Moves a placeholder's content next to (or into) the element its selector
/// names, and keeps doing so as the placeholder's content changes.
///
/// Passes are deferred to the next rendering frame and run on the tokio
/// runtime; their errors go to the [`ErrorSink`], never to the caller.
pub struct ContentRelocator {
    inner: Arc<Inner>,
}

struct Inner {
    dom: SharedDom,
    placeholder: NodeId,
    options: watch::Receiver<RelocationOptions>,
    environment: Environment,
    frames: FrameScheduler,
    sink: Arc<dyn ErrorSink>,
    placed: broadcast::Sender<Placed>,
    state: Mutex<LifecycleState>,
    /// Set while active. Passes suspend it around their writes.
    watcher: Mutex<Option<ChangeWatcher>>,
    passes: AtomicU64,
}

impl ContentRelocator {
    pub fn new(
        dom: SharedDom,
        placeholder: NodeId,
        options: watch::Receiver<RelocationOptions>,
        environment: Environment,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        let (placed, _) = broadcast::channel(PLACED_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                dom,
                placeholder,
                options,
                environment,
                frames: FrameScheduler::new(environment.frame_budget),
                sink,
                placed,
                state: Mutex::new(LifecycleState::Idle),
                watcher: Mutex::new(None),
                passes: AtomicU64::new(0),
            }),
        }
    }

    /// Receive a [`Placed`] for every successful pass from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Placed> {
        self.inner.placed.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state()
    }

    pub fn placeholder(&self) -> NodeId {
        self.inner.placeholder
    }

    /// Number of passes that completed successfully.
    pub fn pass_count(&self) -> u64 {
        self.inner.passes.load(Ordering::Relaxed)
    }

    /// Number of passes that waited for a frame, including skipped ones.
    pub fn deferred_frames(&self) -> u64 {
        self.inner.frames.deferred()
    }

    /// Run the first pass, then watch the placeholder for changes.
    ///
    /// Without an interactive environment this does nothing at all: no
    /// writes, no observation. Mounting twice is ignored.
    pub async fn mount(&mut self) {
        if self.state() != LifecycleState::Idle {
            warn!("relocator for {:?} mounted twice", self.inner.placeholder);
            return;
        }
        if !self.inner.environment.interactive {
            debug!("non-interactive environment, leaving {:?} in place", self.inner.placeholder);
            return;
        }
        self.inner.set_state(LifecycleState::Active);

        // Runs to completion before observation starts, so nothing is missed in between.
        self.inner.run_pass().await;

        let pass_inner = Arc::clone(&self.inner);
        let on_change: ChangeCallback = Arc::new(move || {
            let inner = Arc::clone(&pass_inner);
            tokio::spawn(async move {
                inner.run_pass().await;
            });
        });
        let options = self.inner.options.clone();
        let interval = move || options.borrow().debounce();
        match ChangeWatcher::start(&self.inner.dom, self.inner.placeholder, interval, on_change) {
            Ok(watcher) => {
                self.inner.set_watcher(watcher);
                info!("relocator for {:?} active", self.inner.placeholder);
            }
            Err(err) => self.inner.sink.report(&err),
        }
    }

    /// Run one pass now (after the next frame), outside the debounce schedule.
    /// Does nothing unless the relocator is active.
    pub async fn run_pass(&self) {
        self.inner.run_pass().await;
    }

    /// Stop watching and cancel any pending pass. Idempotent.
    /// Locks the document: do not call while holding its lock.
    pub fn teardown(&mut self) {
        if self.state() == LifecycleState::TornDown {
            return;
        }
        self.inner.set_state(LifecycleState::TornDown);
        // Stopped outside the slot's lock: `stop` locks the document.
        if let Some(mut watcher) = self.inner.take_watcher() {
            watcher.stop();
        }
        debug!("relocator for {:?} torn down", self.inner.placeholder);
    }
}

impl Drop for ContentRelocator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Inner {
    fn state(&self) -> LifecycleState {
        self.state
            .lock()
            .map_or(LifecycleState::TornDown, |state| *state)
    }

    fn set_state(&self, next: LifecycleState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    fn set_watcher(&self, watcher: ChangeWatcher) {
        if let Ok(mut slot) = self.watcher.lock() {
            *slot = Some(watcher);
        }
    }

    fn take_watcher(&self) -> Option<ChangeWatcher> {
        self.watcher.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Wait for the next frame, then place unless torn down in the meantime.
    /// Success notifies subscribers; failure goes to the sink and aborts only this pass.
    async fn run_pass(&self) {
        self.frames.next_frame().await;
        if self.state() != LifecycleState::Active {
            debug!("skipping pass for {:?}: not active", self.placeholder);
            return;
        }
        match self.place_now() {
            Ok(()) => {
                self.passes.fetch_add(1, Ordering::Relaxed);
                if self.placed.send(Placed).is_err() {
                    trace!("no placement subscribers");
                }
            }
            Err(err) => self.sink.report(&err),
        }
    }

    fn place_now(&self) -> Result<()> {
        let options = self.options.borrow().clone();
        // Lock order: watcher slot, then document.
        let watcher = self.watcher.lock().map_err(|_| RelocateError::Poisoned)?;
        let mut dom = self.dom.lock().map_err(|_| RelocateError::Poisoned)?;

        let anchor = resolve(&dom, &options.selector)?;
        let content = extract(&mut dom, self.placeholder)?;

        if let Some(active) = watcher.as_ref() {
            active.suspend(&mut dom);
        }
        let placed = place(&mut dom, options.place, anchor, &content);
        if placed.is_ok() && options.remove_host {
            dom.detach(self.placeholder);
        }
        if let Some(active) = watcher.as_ref() {
            active.resume(&mut dom);
        }
        placed?;

        debug!(
            "pass placed {} node(s) {} `{}`",
            content.len(),
            options.place,
            options.selector
        );
        Ok(())
    }
}
