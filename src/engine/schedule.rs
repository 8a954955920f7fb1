//! RecomputeScheduler: single-flight debounced recompute
//!
//! The host reports each edit with `request(now)` and arms a timer. When a
//! timer fires it calls `poll(now)`; only the latest request ever comes
//! due, so stale timers find nothing to run. Time is passed in by the
//! caller, which keeps the scheduler free of any clock.

use wasm_bindgen::prelude::*;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    generation: u64,
    due_at: f64,
}

// =============================================================================
// RecomputeScheduler
// =============================================================================

/// Last-request-wins debouncer
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    delay_ms: f64,
    pending: Option<Pending>,
    /// Generation of the most recent request
    generation: u64,
    request_count: u64,
    superseded_count: u64,
    fired_count: u64,
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new(150.0)
    }
}

#[wasm_bindgen]
impl RecomputeScheduler {
    #[wasm_bindgen(constructor)]
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: None,
            generation: 0,
            request_count: 0,
            superseded_count: 0,
            fired_count: 0,
        }
    }

    /// Record an edit at `now_ms`; replaces any pending request
    #[wasm_bindgen(js_name = request)]
    pub fn js_request(&mut self, now_ms: f64) -> f64 {
        self.request(now_ms) as f64
    }

    /// True (once) when the latest request has come due
    #[wasm_bindgen(js_name = poll)]
    pub fn js_poll(&mut self, now_ms: f64) -> bool {
        self.take_due(now_ms).is_some()
    }

    /// Milliseconds until the pending request is due, or -1 when idle
    #[wasm_bindgen(js_name = msUntilDue)]
    pub fn js_ms_until_due(&self, now_ms: f64) -> f64 {
        self.remaining_ms(now_ms).unwrap_or(-1.0)
    }

    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[wasm_bindgen(js_name = getDelayMs)]
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    #[wasm_bindgen(js_name = getRequestCount)]
    pub fn request_count(&self) -> u32 {
        self.request_count as u32
    }

    #[wasm_bindgen(js_name = getSupersededCount)]
    pub fn superseded_count(&self) -> u32 {
        self.superseded_count as u32
    }

    #[wasm_bindgen(js_name = getFiredCount)]
    pub fn fired_count(&self) -> u32 {
        self.fired_count as u32
    }

    /// Drop the pending request without running it
    #[wasm_bindgen]
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.superseded_count += 1;
        }
    }

    /// Reset the scheduler state
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.pending = None;
        self.generation = 0;
        self.request_count = 0;
        self.superseded_count = 0;
        self.fired_count = 0;
    }
}

impl RecomputeScheduler {
    /// Record an edit; returns the generation that will run if nothing
    /// supersedes it
    pub fn request(&mut self, now_ms: f64) -> u64 {
        if self.pending.is_some() {
            self.superseded_count += 1;
        }
        self.generation += 1;
        self.request_count += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            due_at: now_ms + self.delay_ms,
        });
        self.generation
    }

    /// Take the pending request if its deadline has passed
    pub fn take_due(&mut self, now_ms: f64) -> Option<u64> {
        match self.pending {
            Some(pending) if now_ms >= pending.due_at => {
                self.pending = None;
                self.fired_count += 1;
                Some(pending.generation)
            }
            _ => None,
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.pending.map(|p| (p.due_at - now_ms).max(0.0))
    }

    /// Whether `generation` is still the newest request
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}
