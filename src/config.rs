//! Configuration for the pattern engine
//!
//! Every field has a default so the host can pass `{}`, a partial object,
//! or nothing at all.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Engine configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Line prefix (after trimming) that toggles a fenced code block
    #[serde(default = "default_fence_marker")]
    pub fence_marker: String,
    /// Debounce window for recompute requests, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: f64,
    /// Prefix joined with a pattern's style name to form its CSS class
    #[serde(default = "default_style_prefix")]
    pub style_prefix: String,
    /// Selector that scopes generated style rules to the editor
    #[serde(default = "default_style_scope")]
    pub style_scope: String,
    /// Owner id the host uses when publishing markers
    #[serde(default = "default_marker_owner")]
    pub marker_owner: String,
    /// Command id attached to code lenses
    #[serde(default = "default_open_url_command")]
    pub open_url_command: String,
}

fn default_fence_marker() -> String { "```".to_string() }
fn default_debounce_ms() -> f64 { 150.0 }
fn default_style_prefix() -> String { "style-".to_string() }
fn default_style_scope() -> String { ".monaco-editor".to_string() }
fn default_marker_owner() -> String { "patterns".to_string() }
fn default_open_url_command() -> String { "openUrl".to_string() }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fence_marker: default_fence_marker(),
            debounce_ms: default_debounce_ms(),
            style_prefix: default_style_prefix(),
            style_scope: default_style_scope(),
            marker_owner: default_marker_owner(),
            open_url_command: default_open_url_command(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> EngineResult<()> {
        if self.fence_marker.trim().is_empty() {
            return Err(EngineError::Config("fenceMarker must not be blank".to_string()));
        }
        if !self.debounce_ms.is_finite() || self.debounce_ms < 0.0 {
            return Err(EngineError::Config(format!(
                "debounceMs must be a non-negative number, got {}",
                self.debounce_ms
            )));
        }
        Ok(())
    }

    /// CSS class applied to occurrences of a pattern with the given style
    pub fn style_class(&self, style: &str) -> String {
        format!("{}{}", self.style_prefix, style)
    }
}
