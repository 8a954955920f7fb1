//! PatternEngine: the context object behind the editor integration
//!
//! Owns the current snapshot (document + compiled patterns + styles) and
//! the recompute scheduler. Every query is a pure function of the snapshot;
//! the engine only decides which snapshot is current.
//!
//! # Usage (JavaScript)
//! ```javascript
//! const engine = new PatternEngine({ debounceMs: 150 });
//! engine.loadDataset(datasetJson);
//!
//! editor.onDidChangeModelContent(() => {
//!   engine.setContent(model.getValue());
//!   engine.requestRecompute();
//!   setTimeout(() => {
//!     const report = engine.pollRecompute();
//!     if (report) apply(report);
//!   }, engine.getDebounceMs());
//! });
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

use super::completion::{self, CompletionList};
use super::context::{resolve_context, TriggerContext};
use super::dataset::{self, decode_patterns, Dataset, Pattern, StyleConfig};
use super::document::Document;
use super::hover::{self, CodeLens, Hover, InlayHint, Link};
use super::index::PatternIndex;
use super::occurrences::{scan_document, ScanReport};
use super::position::{Position, Range};
use super::quickfix::{self, CodeAction};
use super::schedule::RecomputeScheduler;
use crate::config::EngineConfig;
use crate::error::EngineResult;

// =============================================================================
// PatternEngine
// =============================================================================

#[wasm_bindgen]
pub struct PatternEngine {
    config: EngineConfig,
    index: PatternIndex,
    styles: BTreeMap<String, StyleConfig>,
    document: Document,
    scheduler: RecomputeScheduler,
    /// Bumped on every document or pattern swap
    snapshot: u64,
    skipped_patterns: usize,
}

impl Default for PatternEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            scheduler: RecomputeScheduler::new(config.debounce_ms),
            config,
            index: PatternIndex::default(),
            styles: BTreeMap::new(),
            document: Document::default(),
            snapshot: 0,
            skipped_patterns: 0,
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
impl PatternEngine {
    /// Create an engine with an optional configuration object
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<PatternEngine, JsValue> {
        let config: EngineConfig = if config.is_null() || config.is_undefined() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Ok(Self::new(config)?)
    }

    /// Load a dataset (JSON text or object): patterns, styles and content
    #[wasm_bindgen(js_name = loadDataset)]
    pub fn js_load_dataset(&mut self, data: JsValue) -> Result<(), JsValue> {
        let result = Self::dataset_from_js(data)
            .and_then(|dataset| self.load_dataset(dataset).map_err(JsValue::from));
        if let Err(e) = &result {
            web_sys::console::warn_1(&format!("[PatternEngine] Dataset rejected: {:?}", e).into());
        }
        result
    }

    /// Hot reload: swap patterns and styles, keep the editor content
    #[wasm_bindgen(js_name = reloadDataset)]
    pub fn js_reload_dataset(&mut self, data: JsValue) -> Result<(), JsValue> {
        let result = Self::dataset_from_js(data)
            .and_then(|dataset| self.reload_dataset(dataset).map_err(JsValue::from));
        if let Err(e) = &result {
            web_sys::console::warn_1(&format!("[PatternEngine] Reload rejected: {:?}", e).into());
        }
        result
    }

    /// Replace only the pattern list
    #[wasm_bindgen(js_name = replacePatterns)]
    pub fn js_replace_patterns(&mut self, patterns: JsValue) -> Result<(), JsValue> {
        let entries: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(patterns)
            .map_err(|e| JsValue::from_str(&format!("Invalid patterns: {}", e)))?;
        let (patterns, skipped) = decode_patterns(entries);
        self.replace_patterns(patterns)?;
        self.skipped_patterns = skipped;
        Ok(())
    }

    #[wasm_bindgen(js_name = setContent)]
    pub fn js_set_content(&mut self, text: &str) {
        self.set_content(text);
    }

    #[wasm_bindgen(js_name = getContent)]
    pub fn js_get_content(&self) -> String {
        self.document.text()
    }

    /// Decorations + markers for the current snapshot
    #[wasm_bindgen(js_name = scan)]
    pub fn js_scan(&self) -> Result<JsValue, JsValue> {
        to_js(&self.scan())
    }

    #[wasm_bindgen(js_name = triggerContext)]
    pub fn js_trigger_context(
        &self,
        line_number: usize,
        column: usize,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.context_at(Position::new(line_number, column)))
    }

    #[wasm_bindgen(js_name = completions)]
    pub fn js_completions(&self, line_number: usize, column: usize) -> Result<JsValue, JsValue> {
        to_js(&self.completions(Position::new(line_number, column)))
    }

    #[wasm_bindgen(js_name = shouldSuggest)]
    pub fn js_should_suggest(&self, line_number: usize, column: usize) -> bool {
        self.should_suggest(Position::new(line_number, column))
    }

    #[wasm_bindgen(js_name = hover)]
    pub fn js_hover(&self, line_number: usize, column: usize) -> Result<JsValue, JsValue> {
        to_js(&self.hover(Position::new(line_number, column)))
    }

    #[wasm_bindgen(js_name = links)]
    pub fn js_links(&self) -> Result<JsValue, JsValue> {
        to_js(&self.links())
    }

    #[wasm_bindgen(js_name = codeLenses)]
    pub fn js_code_lenses(&self) -> Result<JsValue, JsValue> {
        to_js(&self.code_lenses())
    }

    #[wasm_bindgen(js_name = inlayHints)]
    pub fn js_inlay_hints(&self, start_line: usize, end_line: usize) -> Result<JsValue, JsValue> {
        to_js(&self.inlay_hints(start_line, end_line))
    }

    /// Quick fixes for a `{startLineNumber, startColumn, endLineNumber, endColumn}` range
    #[wasm_bindgen(js_name = codeActions)]
    pub fn js_code_actions(&self, range: JsValue) -> Result<JsValue, JsValue> {
        let range: Range = serde_wasm_bindgen::from_value(range)
            .map_err(|e| JsValue::from_str(&format!("Invalid range: {}", e)))?;
        to_js(&self.code_actions(range))
    }

    /// CSS rules for the dataset's styles
    #[wasm_bindgen(js_name = stylesheet)]
    pub fn js_stylesheet(&self) -> String {
        self.stylesheet()
    }

    #[wasm_bindgen(js_name = triggerCharacters)]
    pub fn js_trigger_characters(&self) -> Result<JsValue, JsValue> {
        to_js(&self.trigger_characters())
    }

    #[wasm_bindgen(js_name = completionTriggerCharacters)]
    pub fn js_completion_trigger_characters(&self) -> Result<JsValue, JsValue> {
        to_js(&self.completion_trigger_characters())
    }

    /// Record an edit now; supersedes any pending recompute
    #[wasm_bindgen(js_name = requestRecompute)]
    pub fn js_request_recompute(&mut self) -> f64 {
        self.request_recompute(js_sys::Date::now()) as f64
    }

    /// The scan report if the latest request is due, otherwise null
    #[wasm_bindgen(js_name = pollRecompute)]
    pub fn js_poll_recompute(&mut self) -> Result<JsValue, JsValue> {
        match self.poll_recompute(js_sys::Date::now()) {
            Some(report) => to_js(&report),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = getDebounceMs)]
    pub fn js_debounce_ms(&self) -> f64 {
        self.config.debounce_ms
    }

    /// Get engine status
    #[wasm_bindgen(js_name = getStatus)]
    pub fn get_status(&self) -> JsValue {
        let status = serde_json::json!({
            "snapshot": self.snapshot,
            "pattern_count": self.index.len(),
            "skipped_patterns": self.skipped_patterns,
            "style_count": self.styles.len(),
            "line_count": self.document.line_count(),
            "trigger_characters": self.index.trigger_characters(),
            "recompute_pending": self.scheduler.is_pending(),
            "config": self.config,
        });

        JsValue::from_str(&status.to_string())
    }
}

impl PatternEngine {
    /// Create an engine with an empty snapshot
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: RecomputeScheduler::new(config.debounce_ms),
            config,
            ..Default::default()
        })
    }

    fn dataset_from_js(data: JsValue) -> Result<Dataset, JsValue> {
        if let Some(text) = data.as_string() {
            return Ok(Dataset::from_json(&text)?);
        }
        let value: serde_json::Value = serde_wasm_bindgen::from_value(data)
            .map_err(|e| JsValue::from_str(&format!("Invalid dataset: {}", e)))?;
        Ok(Dataset::from_value(value)?)
    }

    /// Install a dataset, including its content as the document
    pub fn load_dataset(&mut self, dataset: Dataset) -> EngineResult<()> {
        self.apply_dataset(dataset, true)
    }

    /// Install a dataset's patterns and styles, keeping the current document
    pub fn reload_dataset(&mut self, dataset: Dataset) -> EngineResult<()> {
        self.apply_dataset(dataset, false)
    }

    /// Parse and install a dataset from JSON text. On failure the current
    /// snapshot stays as it was.
    pub fn load_json(&mut self, json: &str) -> EngineResult<()> {
        match Dataset::from_json(json) {
            Ok(dataset) => self.load_dataset(dataset),
            Err(err) => {
                tracing::warn!(error = %err, "dataset rejected, keeping previous snapshot");
                Err(err)
            }
        }
    }

    fn apply_dataset(&mut self, dataset: Dataset, replace_content: bool) -> EngineResult<()> {
        // build before touching state so a failure leaves the old snapshot
        let index = PatternIndex::build(dataset.patterns)?;

        self.index = index;
        self.styles = dataset.styles;
        self.skipped_patterns = dataset.skipped_patterns;
        if replace_content {
            self.document = Document::new(&dataset.content);
        }
        self.snapshot += 1;

        tracing::debug!(
            snapshot = self.snapshot,
            patterns = self.index.len(),
            skipped = self.skipped_patterns,
            styles = self.styles.len(),
            replace_content,
            "dataset applied"
        );
        Ok(())
    }

    /// Swap the pattern set, keeping styles and document
    pub fn replace_patterns(&mut self, patterns: Vec<Pattern>) -> EngineResult<()> {
        self.index = PatternIndex::build(patterns)?;
        self.skipped_patterns = 0;
        self.snapshot += 1;
        Ok(())
    }

    pub fn set_content(&mut self, text: &str) {
        self.document = Document::new(text);
        self.snapshot += 1;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &PatternIndex {
        &self.index
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn snapshot_id(&self) -> u64 {
        self.snapshot
    }

    pub fn skipped_patterns(&self) -> usize {
        self.skipped_patterns
    }

    pub fn scheduler(&self) -> &RecomputeScheduler {
        &self.scheduler
    }

    // ---- queries -------------------------------------------------------

    pub fn scan(&self) -> ScanReport {
        scan_document(&self.index, &self.document, &self.config)
    }

    pub fn context_at(&self, position: Position) -> Option<TriggerContext> {
        let line = self.document.line(position.line_number)?;
        resolve_context(line, position, self.index.trigger_characters())
    }

    pub fn completions(&self, position: Position) -> CompletionList {
        match self.context_at(position) {
            Some(ctx) => completion::complete(&self.index, &ctx),
            None => CompletionList::default(),
        }
    }

    pub fn should_suggest(&self, position: Position) -> bool {
        self.context_at(position)
            .is_some_and(|ctx| completion::should_suggest(&self.index, &ctx))
    }

    pub fn hover(&self, position: Position) -> Option<Hover> {
        hover::hover(&self.index, &self.document, position)
    }

    pub fn links(&self) -> Vec<Link> {
        hover::links(&self.index, &self.document, &self.config)
    }

    pub fn code_lenses(&self) -> Vec<CodeLens> {
        hover::code_lenses(&self.index, &self.document, &self.config)
    }

    pub fn inlay_hints(&self, start_line: usize, end_line: usize) -> Vec<InlayHint> {
        hover::inlay_hints(&self.index, &self.document, &self.config, start_line, end_line)
    }

    pub fn code_actions(&self, range: Range) -> Vec<CodeAction> {
        quickfix::code_actions(&self.index, &self.document, range)
    }

    pub fn stylesheet(&self) -> String {
        dataset::stylesheet(&self.styles, &self.config)
    }

    pub fn trigger_characters(&self) -> Vec<String> {
        self.index.trigger_characters().to_vec()
    }

    pub fn completion_trigger_characters(&self) -> Vec<String> {
        completion::completion_trigger_characters(&self.index)
    }

    // ---- scheduling ----------------------------------------------------

    pub fn request_recompute(&mut self, now_ms: f64) -> u64 {
        self.scheduler.request(now_ms)
    }

    /// Run the scan if the latest request is due. Always scans the snapshot
    /// current at poll time.
    pub fn poll_recompute(&mut self, now_ms: f64) -> Option<ScanReport> {
        self.scheduler.take_due(now_ms)?;
        Some(self.scan())
    }
}
