//! Stateful random streams.

use std::f64::consts::TAU;
use std::sync::{Arc, Mutex};

use ndarray::{Array, ArrayBase, DataMut, Dimension, ShapeBuilder};
use once_cell::sync::Lazy;
use tracing::{debug, instrument};

use crate::element::{Element, ElementKind};
use crate::engine::{ChaChaEngine, RandomEngine};
use crate::error::RandomError;
use crate::shared::{self, SharedEngine, lock};
use crate::state::EngineState;

/// A random stream on the process-wide ChaCha12 engine.
pub type Rand = StatefulRandom<ChaChaEngine>;

static DEFAULT: Lazy<Rand> = Lazy::new(Rand::new);

/// Returns the process-wide default stream.
///
/// Created on first use and kept for the life of the process. Use it where an
/// isolated stream is not needed.
#[must_use]
pub fn default_rand() -> &'static Rand {
    &DEFAULT
}

/// A random stream that behaves as if it owned its engine.
///
/// The stream only stores a snapshot; every operation borrows the shared
/// engine for its duration (see [`SharedEngine::run`]). All operations take
/// `&self`, so one stream can be used from several threads. Calls on any
/// streams of the same engine are serialized.
#[derive(Debug)]
pub struct StatefulRandom<E = ChaChaEngine> {
    engine: Arc<SharedEngine<E>>,
    state: Mutex<EngineState>,
}

impl Rand {
    /// Creates a stream starting from the global engine's live state.
    ///
    /// The global engine is always restored after an operation, so its live
    /// state never moves. Every stream created this way starts at the same
    /// point, and so does [`default_rand`] when it is first used: unseeded
    /// streams are not independent of each other or of the default stream.
    /// Seed them (or use [`Rand::with_seed`]) to get independent sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use randmux_core::Rand;
    ///
    /// let a = Rand::new();
    /// let b = Rand::new();
    /// assert_eq!(a.randint(0, Some(1_000))?, b.randint(0, Some(1_000))?);
    ///
    /// a.seed(1);
    /// b.seed(2);
    /// assert_ne!(a.state(), b.state());
    /// # Ok::<(), randmux_core::RandomError>(())
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::on(shared::global())
    }

    /// Creates a stream at the start of the sequence for `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::seeded_on(shared::global(), seed)
    }

    /// Creates a stream resuming from a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if `state` is not a ChaCha12
    /// snapshot.
    pub fn from_state(state: EngineState) -> Result<Self, RandomError> {
        let rand = Self::new();
        rand.set_state(state)?;
        Ok(rand)
    }
}

impl Default for Rand {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RandomEngine> Clone for StatefulRandom<E> {
    /// Forks the stream: the clone continues from the same position
    /// independently.
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            state: Mutex::new(self.state()),
        }
    }
}

/// Resolves `randint` bounds: `[low, high)`, or `[0, low)` without `high`.
fn int_range(low: i64, high: Option<i64>) -> Result<(i64, i64), RandomError> {
    let (low, high) = match high {
        Some(high) => (low, high),
        None => (0, low),
    };
    if low >= high {
        debug!(low, high, "rejected empty integer range");
        return Err(RandomError::invalid(format!(
            "empty integer range [{low}, {high})"
        )));
    }
    Ok((low, high))
}

impl<E: RandomEngine> StatefulRandom<E> {
    /// Creates a stream on `engine`, starting from its live state.
    #[must_use]
    pub fn on(engine: Arc<SharedEngine<E>>) -> Self {
        let state = Mutex::new(engine.snapshot());
        Self { engine, state }
    }

    /// Creates a stream on `engine` at the start of the sequence for `seed`.
    #[must_use]
    pub fn seeded_on(engine: Arc<SharedEngine<E>>, seed: u64) -> Self {
        let rand = Self::on(engine);
        rand.seed(seed);
        rand
    }

    /// Returns a copy of the stream's current snapshot.
    #[must_use]
    pub fn state(&self) -> EngineState {
        lock(&self.state, "stream").clone()
    }

    /// Moves the stream to a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the engine cannot load
    /// `state`. The stream is unchanged then.
    pub fn set_state(&self, state: EngineState) -> Result<(), RandomError> {
        self.engine.check(&state)?;
        *lock(&self.state, "stream") = state;
        Ok(())
    }

    /// Restarts the stream at the canonical sequence for `seed`.
    #[instrument(level = "debug", skip(self))]
    pub fn seed(&self, seed: u64) {
        self.engine.reseed(&self.state, seed);
    }

    /// Fills `buffer` with uniform draws from `[-1, 1)`.
    ///
    /// # Errors
    ///
    /// See [`StatefulRandom::fill_range`].
    pub fn fill<A, S, D>(&self, buffer: &mut ArrayBase<S, D>) -> Result<(), RandomError>
    where
        A: Element,
        S: DataMut<Elem = A>,
        D: Dimension,
    {
        self.fill_range(buffer, -1.0, 1.0)
    }

    /// Fills every element of `buffer`, in logical order, with an independent
    /// draw.
    ///
    /// Real elements are uniform over `[min, max)`. Complex elements get a
    /// magnitude uniform over `[0, max - min)` and a phase uniform over
    /// `[0, 2π)`, so they are spread evenly by radius rather than by area,
    /// and `min` does not shift them. All magnitudes are drawn before all
    /// phases.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::InvalidArgument` if the element type cannot be
    /// filled, if the bounds are not finite with `min < max`, or if the
    /// element type has no value in the requested range (an `f32` buffer and
    /// a range narrower than one `f32` step). Nothing is drawn in any case.
    #[instrument(level = "trace", skip(self, buffer), fields(len = buffer.len()))]
    pub fn fill_range<A, S, D>(
        &self,
        buffer: &mut ArrayBase<S, D>,
        min: f64,
        max: f64,
    ) -> Result<(), RandomError>
    where
        A: Element,
        S: DataMut<Elem = A>,
        D: Dimension,
    {
        let span = max - min;
        if !(min.is_finite() && max.is_finite() && span.is_finite()) || min >= max {
            debug!(min, max, "rejected fill bounds");
            return Err(RandomError::invalid(format!(
                "fill bounds must be finite with min < max, got [{min}, {max})"
            )));
        }

        let representable = match A::KIND {
            ElementKind::Unsupported => {
                debug!(element = A::NAME, "rejected fill element type");
                return Err(RandomError::invalid(format!(
                    "cannot fill a buffer of {}",
                    A::NAME
                )));
            }
            ElementKind::Real => A::from_real(min, min, max).is_some(),
            ElementKind::Complex => A::from_polar(0.0, 0.0, span).is_some(),
        };
        if !representable {
            debug!(element = A::NAME, min, max, "rejected unrepresentable fill range");
            return Err(RandomError::invalid(format!(
                "{} has no value in [{min}, {max})",
                A::NAME
            )));
        }

        let n = buffer.len();
        if A::KIND == ElementKind::Complex {
            let (magnitudes, phases) = self.engine.run(&self.state, |e| {
                let mut magnitudes = vec![0.0; n];
                let mut phases = vec![0.0; n];
                e.uniform(&mut magnitudes);
                e.uniform(&mut phases);
                (magnitudes, phases)
            })?;
            for ((slot, u), v) in buffer.iter_mut().zip(magnitudes).zip(phases) {
                if let Some(value) = A::from_polar(u * span, v * TAU, span) {
                    *slot = value;
                }
            }
        } else {
            let draws = self.engine.run(&self.state, |e| {
                let mut draws = vec![0.0; n];
                e.uniform(&mut draws);
                draws
            })?;
            for (slot, u) in buffer.iter_mut().zip(draws) {
                if let Some(value) = A::from_real(u * span + min, min, max) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    /// Permutes `items` in place.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the stream's snapshot
    /// cannot be loaded.
    pub fn shuffle<T>(&self, items: &mut [T]) -> Result<(), RandomError> {
        self.engine.run(&self.state, |e| e.shuffle(items))
    }

    /// Returns a random ordering of `0..n`.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the stream's snapshot
    /// cannot be loaded.
    pub fn permutation(&self, n: usize) -> Result<Vec<usize>, RandomError> {
        self.engine.run(&self.state, |e| e.permutation(n))
    }

    /// Returns a randomly ordered copy of `items`, leaving `items` as is.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` if the stream's snapshot
    /// cannot be loaded.
    pub fn permutation_of<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, RandomError> {
        let mut permuted = items.to_vec();
        self.shuffle(&mut permuted)?;
        Ok(permuted)
    }

    /// Draws an integer from `[low, high)`, or from `[0, low)` when `high` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::InvalidArgument` if the range is empty.
    pub fn randint(&self, low: i64, high: Option<i64>) -> Result<i64, RandomError> {
        let (low, high) = int_range(low, high)?;
        self.engine.run(&self.state, |e| e.randint(low, high))
    }

    /// Draws an array of independent integers of the given shape, filled in
    /// logical order. Bounds are as for [`StatefulRandom::randint`].
    ///
    /// # Errors
    ///
    /// Returns `RandomError::InvalidArgument` if the range is empty.
    #[instrument(level = "trace", skip(self, shape))]
    pub fn randint_array<Sh>(
        &self,
        low: i64,
        high: Option<i64>,
        shape: Sh,
    ) -> Result<Array<i64, Sh::Dim>, RandomError>
    where
        Sh: ShapeBuilder,
    {
        let (low, high) = int_range(low, high)?;
        self.engine.run(&self.state, |e| {
            Array::from_shape_simple_fn(shape, || e.randint(low, high))
        })
    }
}
