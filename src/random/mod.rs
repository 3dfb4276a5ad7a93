//! Seeded random streams.
//!
//! Every consumer of randomness names its own stream with `define_rng!`. All streams are
//! derived from a single base seed: the stream for `R` is seeded with
//! `base_seed + hash_str(R::get_name())`, so adding a new stream never perturbs the draws
//! of an existing one and the same base seed always reproduces the same run.
mod macros;
mod random_source;
mod sampling_algorithms;

pub use macros::define_rng;
pub use random_source::RandomSource;
pub use sampling_algorithms::{sample_multiple_from_known_length, sample_and_split};

pub trait RngId: Copy + Clone + 'static {
    fn get_name() -> &'static str;
}
