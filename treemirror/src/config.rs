//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::DEFAULT_HIGHLIGHT_WINDOW;
use crate::filter::Filter;
use crate::search::SearchMode;
use crate::selection::HiddenSelectionPolicy;

/// Per-session behaviour.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Debounce window for highlight requests, in milliseconds.
    pub highlight_debounce_ms: u64,

    /// How search patterns are interpreted.
    pub search_mode: SearchMode,

    /// Match search patterns against keys as well as names.
    pub search_keys: bool,

    /// What happens to a selection that becomes hidden.
    pub on_hidden_selection: HiddenSelectionPolicy,

    /// Filter active when the session starts.
    pub filter: Filter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            highlight_debounce_ms: DEFAULT_HIGHLIGHT_WINDOW.as_millis() as u64,
            search_mode: SearchMode::default(),
            search_keys: false,
            on_hidden_selection: HiddenSelectionPolicy::default(),
            filter: Filter::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn highlight_debounce(&self) -> Duration {
        Duration::from_millis(self.highlight_debounce_ms)
    }

    /// Set the highlight debounce window.
    pub fn with_highlight_debounce(mut self, window: Duration) -> Self {
        self.highlight_debounce_ms = window.as_millis() as u64;
        self
    }

    /// Set the search matcher kind.
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Also match keys when searching.
    pub fn search_keys(mut self) -> Self {
        self.search_keys = true;
        self
    }

    /// Set the hidden-selection policy.
    pub fn on_hidden_selection(mut self, policy: HiddenSelectionPolicy) -> Self {
        self.on_hidden_selection = policy;
        self
    }

    /// Set the initial filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}
