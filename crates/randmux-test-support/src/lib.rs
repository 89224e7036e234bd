//! Shared test engines for randmux.

mod counter;
mod recording;

pub use counter::CounterEngine;
pub use recording::{CallLog, EngineCall, RecordingEngine};
