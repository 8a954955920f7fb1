//! WASM browser tests for the PatternEngine bindings.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`
#![cfg(target_arch = "wasm32")]

use patterncore::{PatternEngine, ScanReport};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const DATASET: &str = r#"{
    "content": "hello @world",
    "styles": {"person": {"css": "color: gold;"}},
    "patterns": [{"word": "world", "triggerCharacter": "@", "style": "person"}]
}"#;

fn loaded() -> PatternEngine {
    let mut engine = PatternEngine::js_new(JsValue::UNDEFINED).unwrap();
    engine.js_load_dataset(JsValue::from_str(DATASET)).unwrap();
    engine
}

#[wasm_bindgen_test]
fn test_scan_round_trips_through_js() {
    let engine = loaded();
    let value = engine.js_scan().unwrap();
    let report: ScanReport = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(report.decorations.len(), 1);
    assert_eq!(report.decorations[0].range.start_column, 7);
}

#[wasm_bindgen_test]
fn test_rejected_dataset_keeps_snapshot() {
    let mut engine = loaded();
    assert!(engine.js_load_dataset(JsValue::from_str("{ nope")).is_err());
    assert_eq!(engine.js_get_content(), "hello @world");
}

#[wasm_bindgen_test]
fn test_should_suggest_from_js() {
    let mut engine = loaded();
    engine.js_set_content("hi @wo");
    assert!(engine.js_should_suggest(1, 7));
    assert!(!engine.js_should_suggest(1, 1));
}

#[wasm_bindgen_test]
fn test_poll_without_request_is_null() {
    let mut engine = loaded();
    assert!(engine.js_poll_recompute().unwrap().is_null());
}
