//! Randomness provider.
//!
//! Every sampler takes an explicit `&mut R: Rng`. Runs use a seeded ChaCha8 stream so a
//! run is reproducible from its seed alone.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// RNG used for simulation runs.
pub type SimRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Pick a fresh seed from OS entropy, for runs that did not configure one.
///
/// The caller should report the returned seed so the run can be replayed.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}
