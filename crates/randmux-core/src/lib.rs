//! Randmux Core — independent random streams over one shared engine.
//!
//! Every `StatefulRandom` keeps its own engine snapshot. Each operation
//! locks the shared engine, swaps the snapshot in, runs, captures the new
//! state and swaps the previous state back before releasing the lock.

pub mod element;
pub mod engine;
pub mod error;
pub mod random;
pub mod shared;
pub mod state;

pub use element::{Element, ElementKind};
pub use engine::{ChaChaEngine, RandomEngine};
pub use error::RandomError;
pub use random::{Rand, StatefulRandom, default_rand};
pub use shared::SharedEngine;
pub use state::EngineState;
