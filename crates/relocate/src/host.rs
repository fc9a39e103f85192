//! Capabilities the hosting environment lends the engine.

use crate::config::RelocateConfig;
use crate::error::RelocateError;
use core::mem;
use core::time::Duration;
use log::error;
use std::sync::{Arc, Mutex};

/// What the host can offer: whether a live, mutable document exists and how
/// long its rendering frames are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub interactive: bool,
    pub frame_budget: Duration,
}

impl Environment {
    /// A live document rendered every `frame_budget`.
    pub const fn interactive(frame_budget: Duration) -> Self {
        Self {
            interactive: true,
            frame_budget,
        }
    }

    /// A non-interactive rendering context: relocation is a silent no-op.
    pub const fn headless() -> Self {
        Self {
            interactive: false,
            frame_budget: Duration::from_millis(16),
        }
    }

    pub const fn from_config(config: &RelocateConfig) -> Self {
        Self {
            interactive: config.interactive,
            frame_budget: config.frame_budget(),
        }
    }
}

/// Receives the errors of passes that run detached from any caller.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &RelocateError);
}

/// Reports through the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, error: &RelocateError) {
        error!("content relocation failed: {error}");
    }
}

/// Keeps every reported error for later inspection. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorSink {
    errors: Arc<Mutex<Vec<RelocateError>>>,
}

impl CollectingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the errors reported so far.
    pub fn errors(&self) -> Vec<RelocateError> {
        self.errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    /// Drain the errors reported so far.
    pub fn take(&self) -> Vec<RelocateError> {
        self.errors
            .lock()
            .map(|mut errors| mem::take(&mut *errors))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_ok_and(|errors| errors.is_empty())
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, error: &RelocateError) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error.clone());
        }
    }
}
