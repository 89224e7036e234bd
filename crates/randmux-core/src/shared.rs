//! The shared engine and its swap protocol.
//!
//! Operations run inside a [`Swap`]: the engine lock is held for the whole
//! operation, the state that was live when the lock was taken is saved, and
//! dropping the swap puts it back before the lock is released. A stream's
//! snapshot is loaded after the save and captured before the restore, so no
//! operation leaves a lasting effect on anything but the calling stream.

use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::{debug, error, trace, warn};

use crate::engine::{ChaChaEngine, RandomEngine};
use crate::error::RandomError;
use crate::state::EngineState;

static GLOBAL: Lazy<Arc<SharedEngine<ChaChaEngine>>> =
    Lazy::new(|| Arc::new(SharedEngine::new(ChaChaEngine::from_entropy())));

/// Returns the process-wide engine, keyed from entropy on first use.
#[must_use]
pub fn global() -> Arc<SharedEngine<ChaChaEngine>> {
    Arc::clone(&GLOBAL)
}

/// One engine shared by any number of streams.
#[derive(Debug)]
pub struct SharedEngine<E> {
    engine: Mutex<E>,
}

/// Holds the engine lock and restores the saved state on drop.
struct Swap<'a, E: RandomEngine> {
    engine: MutexGuard<'a, E>,
    outer: EngineState,
}

impl<E: RandomEngine> Drop for Swap<'_, E> {
    fn drop(&mut self) {
        match self.engine.restore(&self.outer) {
            Ok(()) => trace!("restored outer engine state"),
            Err(e) => error!(error = %e, "failed to restore outer engine state"),
        }
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// Engine state is restored by `Swap::drop` during unwinding, and stream
/// snapshots are only written once an operation has completed, so the data
/// behind a poisoned lock is still consistent.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(lock = what, "recovering poisoned lock");
        poisoned.into_inner()
    })
}

impl<E: RandomEngine> SharedEngine<E> {
    /// Wraps `engine` for shared use.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    /// Captures the engine's live state.
    #[must_use]
    pub fn snapshot(&self) -> EngineState {
        lock(&self.engine, "engine").snapshot()
    }

    fn enter(&self) -> Swap<'_, E> {
        let engine = lock(&self.engine, "engine");
        let outer = engine.snapshot();
        trace!(algorithm = engine.algorithm(), "saved outer engine state");
        Swap { engine, outer }
    }

    /// Runs `op` against the engine with `stream` loaded, then stores the
    /// engine's resulting state back into `stream`.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the engine refuses the
    /// stream's snapshot. Neither the engine nor `stream` is changed then.
    pub fn run<R>(
        &self,
        stream: &Mutex<EngineState>,
        op: impl FnOnce(&mut E) -> R,
    ) -> Result<R, RandomError> {
        let mut swap = self.enter();
        let mut state = lock(stream, "stream");
        swap.engine.restore(&*state)?;
        trace!("loaded stream state");

        let result = op(&mut *swap.engine);

        *state = swap.engine.snapshot();
        trace!("captured stream state");
        Ok(result)
    }

    /// Seeds the engine with `seed` and stores the fresh state into `stream`.
    pub fn reseed(&self, stream: &Mutex<EngineState>, seed: u64) {
        let mut swap = self.enter();
        swap.engine.reseed(seed);
        *lock(stream, "stream") = swap.engine.snapshot();
        debug!(seed, "reseeded stream");
    }

    /// Checks that `state` can be loaded into this engine without keeping it.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the engine refuses `state`.
    pub fn check(&self, state: &EngineState) -> Result<(), RandomError> {
        let mut swap = self.enter();
        swap.engine.restore(state)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn seeded_stream(seed: u64) -> Mutex<EngineState> {
        Mutex::new(ChaChaEngine::from_seed(seed).snapshot())
    }

    #[test]
    fn test_run_restores_outer_state() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let before = shared.snapshot();
        let stream = seeded_stream(2);

        shared.run(&stream, |e| e.randint(0, 10)).unwrap();

        assert_eq!(shared.snapshot(), before);
    }

    #[test]
    fn test_run_captures_stream_progress() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let stream = seeded_stream(2);
        let mut reference = ChaChaEngine::from_seed(2);

        let drawn = shared.run(&stream, |e| e.randint(0, 1_000)).unwrap();

        assert_eq!(drawn, reference.randint(0, 1_000));
        assert_eq!(*stream.lock().unwrap(), reference.snapshot());
    }

    #[test]
    fn test_run_with_foreign_state_changes_nothing() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let before = shared.snapshot();
        let foreign = EngineState::new("counter", Vec::new(), 0, 3);
        let stream = Mutex::new(foreign.clone());

        let result = shared.run(&stream, |e| e.randint(0, 10));

        assert!(matches!(result, Err(RandomError::IncompatibleState { .. })));
        assert_eq!(shared.snapshot(), before);
        assert_eq!(*stream.lock().unwrap(), foreign);
    }

    #[test]
    fn test_panicking_op_still_restores_and_recovers_lock() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let before = shared.snapshot();
        let stream = seeded_stream(2);
        let stream_before = stream.lock().unwrap().clone();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            shared
                .run(&stream, |e| {
                    e.randint(0, 10);
                    panic!("engine capability failed");
                })
                .ok();
        }));

        assert!(outcome.is_err());
        assert_eq!(shared.snapshot(), before);
        assert_eq!(*lock(&stream, "stream"), stream_before);
    }

    #[test]
    fn test_reseed_ignores_previous_stream_state() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let before = shared.snapshot();
        let stream = seeded_stream(500);

        shared.reseed(&stream, 42);

        assert_eq!(*stream.lock().unwrap(), ChaChaEngine::from_seed(42).snapshot());
        assert_eq!(shared.snapshot(), before);
    }

    #[test]
    fn test_check_leaves_engine_untouched() {
        let shared = SharedEngine::new(ChaChaEngine::from_seed(1));
        let before = shared.snapshot();

        shared.check(&ChaChaEngine::from_seed(9).snapshot()).unwrap();

        assert_eq!(shared.snapshot(), before);
        assert!(shared.check(&EngineState::new("counter", Vec::new(), 0, 0)).is_err());
    }

    #[test]
    fn test_global_is_a_single_engine() {
        assert!(Arc::ptr_eq(&global(), &global()));
    }
}
