use std::any::TypeId;

use log::trace;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::EpiError;
use crate::hashing::{hash_str, HashMap};
use crate::random::sampling_algorithms::{sample_and_split, sample_multiple_from_known_length};
use crate::random::RngId;

/// Holds the base seed and the lazily created stream for each `RngId`.
///
/// The source is an ordinary value: cloning it forks every stream at its current position,
/// which is what makes an `EngineState` replayable.
#[derive(Clone, Debug)]
pub struct RandomSource {
    base_seed: u64,
    streams: HashMap<TypeId, SmallRng>,
}

impl RandomSource {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random source with base seed {base_seed}");
        RandomSource {
            base_seed,
            streams: HashMap::default(),
        }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Gets a mutable reference to the stream associated with the given `RngId`, creating
    /// it from the base seed if it has not been used before.
    fn get_rng<R: RngId>(&mut self) -> &mut SmallRng {
        let base_seed = self.base_seed;
        self.streams.entry(TypeId::of::<R>()).or_insert_with(|| {
            trace!("creating new RNG (seed={}) for {}", base_seed, R::get_name());
            SmallRng::seed_from_u64(base_seed.wrapping_add(hash_str(R::get_name())))
        })
    }

    /// Gets a random sample from the stream associated with the given `RngId` by applying
    /// the specified sampler function.
    pub fn sample<R: RngId, T>(
        &mut self,
        _rng_id: R,
        sampler: impl FnOnce(&mut SmallRng) -> T,
    ) -> T {
        sampler(self.get_rng::<R>())
    }

    /// Gets a random sample within the range provided by `range`
    /// using the stream associated with the given `RngId`.
    pub fn sample_range<R: RngId, S, T>(&mut self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Draws `requested` distinct elements of `pool` uniformly at random.
    ///
    /// # Errors
    ///
    /// `EpiError::CapacityError` if `requested > pool.len()`.
    pub fn sample_without_replacement<R: RngId, T: Copy>(
        &mut self,
        _rng_id: R,
        pool: &[T],
        requested: usize,
    ) -> Result<Vec<T>, EpiError> {
        sample_multiple_from_known_length(self.get_rng::<R>(), pool.iter().copied(), requested)
    }

    /// Draws `requested` distinct elements of `pool` and also returns everything that was
    /// not drawn, as `(drawn, rest)`.
    ///
    /// # Errors
    ///
    /// `EpiError::CapacityError` if `requested > pool.len()`.
    pub fn split_without_replacement<R: RngId, T>(
        &mut self,
        _rng_id: R,
        pool: Vec<T>,
        requested: usize,
    ) -> Result<(Vec<T>, Vec<T>), EpiError> {
        sample_and_split(self.get_rng::<R>(), pool, requested)
    }
}
