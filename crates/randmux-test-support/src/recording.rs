//! Recording engine — a `RandomEngine` that logs every call it receives.

use std::sync::{Arc, Mutex};

use randmux_core::engine::RandomEngine;
use randmux_core::error::RandomError;
use randmux_core::state::EngineState;

use crate::counter::CounterEngine;

/// One call made on a `RecordingEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// `snapshot` returned this state.
    Snapshot(EngineState),
    /// `restore` was asked to load this state.
    Restore(EngineState),
    /// `reseed` with this seed.
    Reseed(u64),
    /// `uniform` for this many values.
    Uniform(usize),
    /// `randint` over `[low, high)`.
    Randint(i64, i64),
    /// `shuffle` of a slice of this length.
    Shuffle(usize),
}

/// Handle to the calls recorded by a `RecordingEngine`, usable after the
/// engine has been moved into a `SharedEngine`.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    /// Returns a copy of every call recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap().clone()
    }

    /// Forgets every call recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, call: EngineCall) {
        self.0.lock().unwrap().push(call);
    }
}

/// A `CounterEngine` that records every call made on it.
#[derive(Debug)]
pub struct RecordingEngine {
    inner: CounterEngine,
    log: CallLog,
}

impl RecordingEngine {
    /// Creates a recording engine around `CounterEngine::new(seed)`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: CounterEngine::new(seed),
            log: CallLog::default(),
        }
    }

    /// Returns a handle to this engine's call log.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl RandomEngine for RecordingEngine {
    fn algorithm(&self) -> &'static str {
        self.inner.algorithm()
    }

    fn snapshot(&self) -> EngineState {
        let state = self.inner.snapshot();
        self.log.push(EngineCall::Snapshot(state.clone()));
        state
    }

    fn restore(&mut self, state: &EngineState) -> Result<(), RandomError> {
        self.log.push(EngineCall::Restore(state.clone()));
        self.inner.restore(state)
    }

    fn reseed(&mut self, seed: u64) {
        self.log.push(EngineCall::Reseed(seed));
        self.inner.reseed(seed);
    }

    fn uniform(&mut self, out: &mut [f64]) {
        self.log.push(EngineCall::Uniform(out.len()));
        self.inner.uniform(out);
    }

    fn randint(&mut self, low: i64, high: i64) -> i64 {
        self.log.push(EngineCall::Randint(low, high));
        self.inner.randint(low, high)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        self.log.push(EngineCall::Shuffle(items.len()));
        self.inner.shuffle(items);
    }
}
