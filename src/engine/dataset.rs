//! Pattern dataset: the JSON blob the host page embeds
//!
//! Shape: `{ content, styles: { name: { css } }, patterns: Pattern[] }`.
//!
//! Loading is tolerant per entry. A pattern that fails to deserialize, or
//! that has no `word`, is dropped and counted; the remaining patterns load.
//! Only a blob that is not a dataset at all is an error.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::error::EngineResult;

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity of a pattern's error descriptor
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Dataset label -> severity. Labels not listed map to `Info`.
const SEVERITY_TABLE: &[(&str, Severity)] = &[
    ("error", Severity::Error),
    ("warning", Severity::Warning),
];

impl Severity {
    pub fn from_label(label: &str) -> Self {
        SEVERITY_TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Info)
    }

    /// Numeric marker severity used by the host editor widget
    pub fn marker_code(self) -> u8 {
        match self {
            Severity::Error => 8,
            Severity::Warning => 4,
            Severity::Info => 2,
        }
    }
}

// =============================================================================
// Types
// =============================================================================

/// A link attached to a pattern
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Action {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Also show this action inside the hover card
    #[serde(default)]
    pub hover: bool,
}

/// A lexical entry of the dataset.
///
/// Only `word` is strict. Optional fields of the wrong type read as absent
/// and malformed actions are dropped one by one, so bad metadata never
/// costs the pattern its decoration or completion.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(default)]
    pub word: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger_character: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<String>,
    /// HTML description shown in hovers and completion docs
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub info: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub inlay: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger_complete: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_replace: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_label: Option<String>,
    #[serde(
        default,
        deserialize_with = "severity_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_actions")]
    pub actions: Vec<Action>,
}

/// Any non-string value reads as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Non-string labels are kept as their JSON text, which maps to `Info`
fn severity_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        other => Ok(Some(other.to_string())),
    }
}

/// `null` or a non-array reads as no actions; bad entries are dropped
fn lenient_actions<'de, D>(deserializer: D) -> Result<Vec<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };

    let mut actions = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Action>(entry) {
            Ok(action) => actions.push(action),
            Err(err) => tracing::warn!(position, error = %err, "skipping malformed action"),
        }
    }
    Ok(actions)
}

impl Pattern {
    /// Convenience constructor used by hosts and tests
    pub fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            ..Default::default()
        }
    }

    pub fn with_trigger(mut self, trigger: &str) -> Self {
        self.trigger_character = Some(trigger.to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Text searched for in the document: trigger + word
    pub fn search_key(&self) -> String {
        match &self.trigger_character {
            Some(trigger) => format!("{}{}", trigger, self.word),
            None => self.word.clone(),
        }
    }

    /// Severity of the error descriptor, if the pattern carries one.
    ///
    /// A descriptor needs both a replacement and a severity label.
    pub fn severity(&self) -> Option<Severity> {
        match (&self.error_replace, &self.error_severity) {
            (Some(_), Some(label)) => Some(Severity::from_label(label)),
            _ => None,
        }
    }

    /// `(label, replacement)` when the pattern offers a quick fix
    pub fn quick_fix(&self) -> Option<(&str, &str)> {
        match (&self.error_label, &self.error_replace) {
            (Some(label), Some(replace)) => Some((label.as_str(), replace.as_str())),
            _ => None,
        }
    }

    /// Text inserted when the completion is accepted
    pub fn insert_text(&self) -> &str {
        self.trigger_complete.as_deref().unwrap_or(&self.word)
    }
}

/// CSS snippet for one named style
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StyleConfig {
    #[serde(default)]
    pub css: String,
}

/// A complete dataset snapshot
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub styles: BTreeMap<String, StyleConfig>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    /// Entries dropped while loading
    #[serde(skip)]
    pub skipped_patterns: usize,
}

/// Top-level shape, with pattern entries left undecoded
#[derive(Deserialize)]
struct RawDataset {
    #[serde(default)]
    content: String,
    #[serde(default)]
    styles: BTreeMap<String, StyleConfig>,
    #[serde(default)]
    patterns: Vec<serde_json::Value>,
}

// =============================================================================
// Loading
// =============================================================================

impl Dataset {
    /// Parse a dataset from its JSON text
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Build a dataset from an already-parsed JSON value
    pub fn from_value(value: serde_json::Value) -> EngineResult<Self> {
        let raw: RawDataset = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawDataset) -> Self {
        let (patterns, skipped_patterns) = decode_patterns(raw.patterns);
        Self {
            content: raw.content,
            styles: raw.styles,
            patterns,
            skipped_patterns,
        }
    }

    /// Style rules for the host to inject, one per named style
    pub fn stylesheet(&self, config: &EngineConfig) -> String {
        stylesheet(&self.styles, config)
    }
}

/// CSS text for a style map, rules in style-name order
pub fn stylesheet(styles: &BTreeMap<String, StyleConfig>, config: &EngineConfig) -> String {
    let mut css = String::new();
    for (name, style) in styles {
        css.push_str(&format!(
            "{} .{} {{ {} }}\n",
            config.style_scope,
            config.style_class(name),
            style.css
        ));
    }
    css
}

/// Decode pattern entries one at a time, keeping the good ones
pub fn decode_patterns(entries: Vec<serde_json::Value>) -> (Vec<Pattern>, usize) {
    let mut patterns = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Pattern>(entry) {
            Ok(pattern) if !pattern.word.is_empty() => patterns.push(pattern),
            Ok(_) => {
                skipped += 1;
                tracing::warn!(position, "skipping pattern without a word");
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(position, error = %err, "skipping malformed pattern");
            }
        }
    }

    (patterns, skipped)
}
