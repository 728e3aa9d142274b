//! RNG wrapper used by replication workers.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// RNG handle handed to world models.
///
/// Every replication owns its own handle. Production workers construct it with
/// [`RngHandle::from_entropy`], which pulls a fresh seed from the operating
/// system for each invocation, so replications never share or derive seeds
/// regardless of whether they run on one thread, a pool, or separate
/// processes. [`RngHandle::from_seed`] exists for tests that need a fixed
/// trajectory.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a handle seeded from the operating system entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a handle from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a mutable reference to the underlying RNG for advanced usage.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
