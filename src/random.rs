//! Seeded randomness behind a narrow index-drawing capability.
//!
//! The cut-point pipeline only ever needs one primitive: "draw an index in
//! `[0, bound)`". Keeping that behind a trait lets tests substitute a scripted
//! source while the production path stays on a reproducible seeded generator.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// ============================================================================
// IndexSource trait
// ============================================================================

/// A source of random indices in `[0, bound)`.
///
/// Implementations must be deterministic given their construction state: the
/// same seed and the same sequence of `bound` arguments must reproduce the
/// same sequence of indices.
pub trait IndexSource {
    /// Draw the next index in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// May panic if `bound` is zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

// ============================================================================
// SeededIndexSource
// ============================================================================

/// Default [`IndexSource`] backed by a seeded xoshiro256++ generator.
#[derive(Debug, Clone)]
pub struct SeededIndexSource {
    rng: Xoshiro256PlusPlus,
}

impl SeededIndexSource {
    /// Create a source from a 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl IndexSource for SeededIndexSource {
    #[inline]
    fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "bound must be nonzero");
        self.rng.gen_range(0..bound)
    }
}

// ============================================================================
// Tests
// ============================================================================
