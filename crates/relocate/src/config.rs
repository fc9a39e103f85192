//! Runtime configuration: host capabilities and per-placeholder relocation options.
//!
//! Both can be built programmatically or read from `RELOCATE_*` environment
//! variables. Options are handed to the engine on a `tokio::sync::watch`
//! channel so a host can change them while the engine runs; every pass reads
//! the latest value.

use crate::error::Result;
use crate::placement::PlacementMode;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::env;

/// Default quiet period after the last mutation before a pass runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 10;

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Host-level settings shared by every relocator.
#[derive(Clone, Debug)]
pub struct RelocateConfig {
    /// Frame budget in milliseconds for deferring placement writes
    pub frame_budget_ms: u64,
    /// Whether a live, mutable document is available
    pub interactive: bool,
}

impl Default for RelocateConfig {
    fn default() -> Self {
        Self::new(16, true)
    }
}

impl RelocateConfig {
    /// Construct a new `RelocateConfig`. The frame budget is at least 1ms.
    #[must_use]
    pub const fn new(frame_budget_ms: u64, interactive: bool) -> Self {
        let budget = if frame_budget_ms < 1 {
            1
        } else {
            frame_budget_ms
        };
        Self {
            frame_budget_ms: budget,
            interactive,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `RELOCATE_FRAME_BUDGET_MS`: Frame budget in milliseconds (default: 16)
    /// - `RELOCATE_INTERACTIVE`: Set to "0" or "false" for a non-interactive host (default: interactive)
    #[must_use]
    pub fn from_env() -> Self {
        let frame_budget_ms = env::var("RELOCATE_FRAME_BUDGET_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(16)
            .max(1);
        let interactive = !matches!(
            env::var("RELOCATE_INTERACTIVE").ok().as_deref(),
            Some("0" | "false")
        );
        Self {
            frame_budget_ms,
            interactive,
        }
    }

    /// Get the frame budget as a `Duration`.
    #[must_use]
    pub const fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }
}

/// What one placeholder relocates, and where.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationOptions {
    /// Selector of the anchor; required.
    pub selector: String,
    #[serde(default)]
    pub place: PlacementMode,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Detach the placeholder itself after each successful placement.
    #[serde(default)]
    pub remove_host: bool,
}

impl RelocationOptions {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            place: PlacementMode::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            remove_host: false,
        }
    }

    #[must_use]
    pub fn with_place(mut self, place: PlacementMode) -> Self {
        self.place = place;
        self
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    #[must_use]
    pub fn with_remove_host(mut self, remove_host: bool) -> Self {
        self.remove_host = remove_host;
        self
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Options for `selector`, with the rest read from the environment.
    ///
    /// Reads the following environment variables:
    /// - `RELOCATE_PLACE`: placement mode (default: before)
    /// - `RELOCATE_DEBOUNCE_MS`: debounce interval in milliseconds (default: 10)
    /// - `RELOCATE_REMOVE_HOST`: Set to "1" or "true" to detach the placeholder after placing
    ///
    /// # Errors
    /// `InvalidPlacementMode` when `RELOCATE_PLACE` names no mode.
    pub fn from_env(selector: impl Into<String>) -> Result<Self> {
        let place = match env::var("RELOCATE_PLACE") {
            Ok(val) => val.parse()?,
            Err(_) => PlacementMode::default(),
        };
        let debounce_ms = env::var("RELOCATE_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        let remove_host = matches!(
            env::var("RELOCATE_REMOVE_HOST").ok().as_deref(),
            Some("1" | "true")
        );
        Ok(Self {
            selector: selector.into(),
            place,
            debounce_ms,
            remove_host,
        })
    }

    /// Parse options from JSON, e.g. `{"selector":"#target","place":"self"}`.
    ///
    /// # Errors
    /// Malformed JSON, a missing selector or an unknown placement mode.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
