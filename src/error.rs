//! Engine error types

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while loading a dataset or building the pattern index.
///
/// Queries never fail; only snapshot construction does, and a failed
/// construction leaves the previous snapshot in place.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("failed to build pattern automaton: {0}")]
    Automaton(#[from] aho_corasick::BuildError),

    #[error("invalid config: {0}")]
    Config(String),
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
