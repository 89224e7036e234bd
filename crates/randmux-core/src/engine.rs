//! PRNG engine abstraction.
//!
//! The engine owns the distribution math. Everything above it only moves
//! snapshots in and out and sequences calls.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::error::RandomError;
use crate::state::EngineState;

/// Abstraction over a stateful pseudo-random number generator.
pub trait RandomEngine: Send {
    /// Identifier written into every snapshot this engine produces.
    fn algorithm(&self) -> &'static str;

    /// Captures the live state.
    fn snapshot(&self) -> EngineState;

    /// Replaces the live state with `state`.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if `state` was not produced by
    /// an engine of the same algorithm or is malformed. The live state is left
    /// untouched in that case.
    fn restore(&mut self, state: &EngineState) -> Result<(), RandomError>;

    /// Resets the engine to the canonical sequence for `seed`.
    fn reseed(&mut self, seed: u64);

    /// Fills `out` with independent draws from `[0, 1)`.
    fn uniform(&mut self, out: &mut [f64]);

    /// Draws one integer from `[low, high)`. Callers guarantee `low < high`.
    fn randint(&mut self, low: i64, high: i64) -> i64;

    /// Permutes `items` in place, every ordering equally likely.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Returns a uniformly random ordering of `0..n`.
    fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        self.shuffle(&mut indices);
        indices
    }
}

/// Production engine backed by ChaCha12.
#[derive(Debug, Clone)]
pub struct ChaChaEngine {
    rng: ChaCha12Rng,
}

impl ChaChaEngine {
    /// Algorithm identifier carried by ChaCha12 snapshots.
    pub const ALGORITHM: &'static str = "chacha12";

    /// Creates an engine positioned at the start of the sequence for `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Creates an engine keyed from the thread-local entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha12Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl RandomEngine for ChaChaEngine {
    fn algorithm(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn snapshot(&self) -> EngineState {
        EngineState::new(
            Self::ALGORITHM,
            self.rng.get_seed().to_vec(),
            self.rng.get_stream(),
            self.rng.get_word_pos(),
        )
    }

    fn restore(&mut self, state: &EngineState) -> Result<(), RandomError> {
        state.expect_algorithm(Self::ALGORITHM)?;
        let key: [u8; 32] = state.key().try_into().map_err(|_| RandomError::IncompatibleState {
            expected: "32-byte key".to_owned(),
            found: format!("{}-byte key", state.key().len()),
        })?;

        let mut rng = ChaCha12Rng::from_seed(key);
        rng.set_stream(state.stream());
        rng.set_word_pos(state.position());
        self.rng = rng;
        Ok(())
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    fn uniform(&mut self, out: &mut [f64]) {
        for value in out {
            *value = self.rng.random::<f64>();
        }
    }

    fn randint(&mut self, low: i64, high: i64) -> i64 {
        self.rng.random_range(low..high)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_resumes_mid_sequence() {
        let mut engine = ChaChaEngine::from_seed(7);
        let mut warmup = [0.0; 3];
        engine.uniform(&mut warmup);
        let state = engine.snapshot();
        let expected: Vec<i64> = (0..5).map(|_| engine.randint(0, 1_000)).collect();

        let mut other = ChaChaEngine::from_seed(99);
        other.restore(&state).unwrap();
        let resumed: Vec<i64> = (0..5).map(|_| other.randint(0, 1_000)).collect();

        assert_eq!(resumed, expected);
    }

    #[test]
    fn test_restore_rejects_foreign_algorithm() {
        let mut engine = ChaChaEngine::from_seed(1);
        let before = engine.snapshot();

        let result = engine.restore(&EngineState::new("counter", Vec::new(), 0, 0));

        assert!(matches!(result, Err(RandomError::IncompatibleState { .. })));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_restore_rejects_short_key() {
        let mut engine = ChaChaEngine::from_seed(1);

        let result = engine.restore(&EngineState::new(ChaChaEngine::ALGORITHM, vec![0; 8], 0, 0));

        assert_eq!(
            result,
            Err(RandomError::IncompatibleState {
                expected: "32-byte key".to_owned(),
                found: "8-byte key".to_owned(),
            })
        );
    }

    #[test]
    fn test_reseed_matches_fresh_engine() {
        let mut engine = ChaChaEngine::from_entropy();
        engine.reseed(42);

        assert_eq!(engine.snapshot(), ChaChaEngine::from_seed(42).snapshot());
    }

    #[test]
    fn test_uniform_stays_in_unit_interval() {
        let mut engine = ChaChaEngine::from_seed(3);
        let mut draws = [0.0; 1_000];
        engine.uniform(&mut draws);

        assert!(draws.iter().all(|u| (0.0..1.0).contains(u)));
    }

    #[test]
    fn test_default_permutation_is_bijection() {
        let mut engine = ChaChaEngine::from_seed(11);

        let mut perm = engine.permutation(50);
        perm.sort_unstable();

        assert_eq!(perm, (0..50).collect::<Vec<_>>());
    }
}
