//! Dense/sparse containers and sampling primitives (C1).
//!
//! Mirrors the scalar/vector storage conventions used across this corpus's
//! statistics code (plain `Vec`-backed structs, no interior mutability) while
//! adding the two primitives the induction core actually needs: a weight
//! vector that tracks whether any example has been sub-sampled out, and a
//! crate-local RNG trait so the core never names `rand`'s traits directly in
//! its public API.

use rand::RngCore;

/// A non-negative per-example weight produced by instance sub-sampling.
///
/// `weight(i) == 0` means example `i` is not in the current sub-sample: it is
/// ignored while searching for a condition but still classified once the
/// rule is committed.
#[derive(Debug, Clone)]
pub struct WeightVector {
    weights: Vec<f64>,
    num_non_zero: usize,
}

impl WeightVector {
    /// All-ones weight vector of length `num_examples`.
    pub fn ones(num_examples: usize) -> Self {
        Self {
            weights: vec![1.0; num_examples],
            num_non_zero: num_examples,
        }
    }

    /// Build from explicit per-example weights.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        let num_non_zero = weights.iter().filter(|&&w| w > 0.0).count();
        Self {
            weights,
            num_non_zero,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, example: usize) -> f64 {
        self.weights[example]
    }

    pub fn is_active(&self, example: usize) -> bool {
        self.weights[example] > 0.0
    }

    pub fn has_zero_weights(&self) -> bool {
        self.num_non_zero < self.weights.len()
    }

    pub fn num_non_zero_weights(&self) -> usize {
        self.num_non_zero
    }
}

/// Crate-local seedable RNG abstraction. Blanket-implemented for anything
/// that already implements [`rand::RngCore`] + `Send`, so the default
/// collaborators in [`crate::rule_induction::collaborators`] can hand in a
/// plain `rand::rngs::StdRng` without the core depending on `rand` traits
/// directly in its public signatures.
pub trait Rng: RngCore + Send {}

impl<T: RngCore + Send> Rng for T {}

/// An index vector produced by feature sub-sampling: the candidate feature
/// indices one top-down induction iteration should search over.
pub type IndexVec = Vec<usize>;

/// Uniform random integer in `[0, bound)` via rejection sampling on
/// `next_u32`, avoiding the modulo bias a bare `next_u32() % bound` would
/// introduce.
pub fn uniform_below(rng: &mut dyn Rng, bound: usize) -> usize {
    if bound == 0 {
        return 0;
    }
    let bound_u32 = bound as u32;
    let zone = u32::MAX - (u32::MAX % bound_u32);
    loop {
        let v = rng.next_u32();
        if v < zone {
            return (v % bound_u32) as usize;
        }
    }
}

/// Fisher-Yates partial shuffle: draw `k` distinct indices from `0..n`
/// without replacement. Used by feature and instance sub-sampling so
/// neither depends on `rand`'s `Rng` extension trait (which does not
/// resolve cleanly through the crate-local `dyn Rng` trait object).
pub fn sample_without_replacement(rng: &mut dyn Rng, n: usize, k: usize) -> IndexVec {
    let mut pool: Vec<usize> = (0..n).collect();
    let k = k.min(n);
    for i in 0..k {
        let j = i + uniform_below(rng, n - i);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}
