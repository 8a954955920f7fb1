//! PatternCore: Pattern Index + Editor Annotation Engine
//!
//! A Rust/WASM implementation of the pattern dataset engine behind the
//! browser editor integration. The host page owns the editor widget; this
//! crate owns everything that is a function of the text and the dataset.
//!
//! # Architecture
//!
//! ## Engine Components
//! - `dataset.rs` - Pattern dataset types and tolerant JSON loading
//! - `document.rs` - Line snapshot of the editor buffer, fence tracking
//! - `index.rs` - PatternIndex: Aho-Corasick over every search key
//! - `occurrences.rs` - Decorations + diagnostic markers for a full scan
//! - `context.rs` - Trigger-context resolution at the cursor
//! - `completion.rs` - Completion candidates and item payloads
//! - `hover.rs` - Hover, links, code lenses, inlay hints
//! - `quickfix.rs` - Quick-fix code actions
//! - `schedule.rs` - Single-flight debounced recompute
//! - `session.rs` - PatternEngine: the context object exposed to JS
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PatternEngine } from 'patterncore';
//!
//! await init();
//!
//! const engine = new PatternEngine();
//! engine.loadDataset(document.getElementById('monacobro-data').textContent);
//!
//! const { decorations, markers } = engine.scan();
//! const items = engine.completions(position.lineNumber, position.column);
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::*;
pub use engine::*;
pub use error::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("patterncore v{}", env!("CARGO_PKG_VERSION"))
}
