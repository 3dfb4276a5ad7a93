//! Deterministic hashing helpers.
//!
//! The hashing data structures in the standard library are randomly seeded, which would make
//! iteration order, and therefore sampling, differ between runs with the same random seed.
//! Everything in the engine that is keyed by a hash uses the `rustc-hash` maps re-exported
//! here instead.
//!
//! The `hash_str` free function derives the per-stream seed offset used in `crate::random`.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
