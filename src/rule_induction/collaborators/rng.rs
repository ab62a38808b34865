//! The RNG collaborator (§6): "deterministic, seedable, integer stream".

use rand::{RngCore, SeedableRng};

use crate::rule_induction::container::Rng as CoreRng;

/// `rand::rngs::StdRng` behind the crate-local [`CoreRng`] trait, so the
/// induction core never names `rand`'s RNG traits directly in its public
/// API (matching this corpus's habit of wrapping third-party traits at the
/// collaborator boundary, e.g. the `Rng` used by `rand_distr` in the
/// simulation module).
#[derive(Clone)]
pub struct DefaultRng(rand::rngs::StdRng);

impl DefaultRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl RngCore for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

// The blanket `impl<T: RngCore + Send> Rng for T` in `container` covers
// `DefaultRng` automatically; this alias just documents the intent.
#[allow(dead_code)]
fn _assert_is_core_rng<T: CoreRng>() {}
#[allow(dead_code)]
fn _default_rng_is_core_rng() {
    _assert_is_core_rng::<DefaultRng>();
}
