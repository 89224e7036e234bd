//! Counter engine — a transparent, predictable `RandomEngine` for tests.

use randmux_core::engine::RandomEngine;
use randmux_core::error::RandomError;
use randmux_core::state::EngineState;

/// An engine whose state is a seed and a draw counter.
///
/// Draw `k` after seeding with `s` yields `(s + k) % 1000 / 1000` from
/// `uniform` and `low + (s + k) % (high - low)` from `randint`. `shuffle`
/// rotates the slice left by one and counts as one draw. Snapshots store the
/// seed as the stream and the counter as the position, so tests can read a
/// stream's progress straight off its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterEngine {
    seed: u64,
    counter: u64,
}

impl CounterEngine {
    /// Algorithm identifier carried by counter snapshots.
    pub const ALGORITHM: &'static str = "counter";

    /// Creates an engine seeded with `seed` and no draws taken.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    /// Builds the snapshot a `CounterEngine` seeded with `seed` would report
    /// after `draws` draws.
    #[must_use]
    pub fn state_after(seed: u64, draws: u64) -> EngineState {
        EngineState::new(Self::ALGORITHM, Vec::new(), seed, u128::from(draws))
    }

    fn next(&mut self) -> u64 {
        let value = self.seed.wrapping_add(self.counter);
        self.counter += 1;
        value
    }
}

impl RandomEngine for CounterEngine {
    fn algorithm(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn snapshot(&self) -> EngineState {
        Self::state_after(self.seed, self.counter)
    }

    fn restore(&mut self, state: &EngineState) -> Result<(), RandomError> {
        state.expect_algorithm(Self::ALGORITHM)?;
        let counter = u64::try_from(state.position()).map_err(|_| {
            RandomError::IncompatibleState {
                expected: "64-bit counter".to_owned(),
                found: state.position().to_string(),
            }
        })?;
        self.seed = state.stream();
        self.counter = counter;
        Ok(())
    }

    fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    #[allow(clippy::cast_precision_loss)]
    fn uniform(&mut self, out: &mut [f64]) {
        for value in out {
            *value = (self.next() % 1000) as f64 / 1000.0;
        }
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn randint(&mut self, low: i64, high: i64) -> i64 {
        let width = high.wrapping_sub(low) as u64;
        low.wrapping_add((self.next() % width) as i64)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        self.next();
        if !items.is_empty() {
            items.rotate_left(1);
        }
    }
}
