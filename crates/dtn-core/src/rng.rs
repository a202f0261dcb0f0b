//! Deterministic RNG wrapper.
//!
//! # Determinism strategy
//!
//! The core keeps two independent random streams:
//!
//! 1. An interface-initialization stream, created with a fixed seed of 0 at
//!    the start of every run.  It supplies per-interface activeness jitter and
//!    the initial scan phase, so interface construction reproduces across runs
//!    regardless of anything else that happened earlier in the process.
//! 2. A per-pass shuffle stream, re-seeded with `floor(sim_time)` for every
//!    host-update pass.  A pass's ordering therefore depends only on the
//!    pass's integer time, never on how many passes preceded it.
//!
//! Both are `SimRng` instances; the split is a caller convention, not a type
//! distinction.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seed value for the interface-initialization stream.
pub const INIT_SEED: u64 = 0;

/// A small, fast, deterministic RNG.
///
/// Intentionally not `Sync`: every stream has exactly one owner.
pub struct SimRng(SmallRng);

impl SimRng {
    /// Seed deterministically.  The same seed always produces the same stream.
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Stream for a host-update pass at integer simulation time `t`.
    ///
    /// Negative times (warm-up) reinterpret the bits; warm-up never shuffles,
    /// so in practice only non-negative times reach this.
    pub fn for_int_time(t: i64) -> Self {
        SimRng::new(t as u64)
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
