//! Feature and instance sub-sampling collaborators (§6).

use crate::rule_induction::container::{sample_without_replacement, IndexVec, Rng, WeightVector};

/// Produces the candidate feature indices one top-down induction iteration
/// should search over. Must be repeatable under a given seed.
pub trait FeatureSubSampling: Send + Sync {
    fn sub_sample(&self, num_features: usize, rng: &mut dyn Rng) -> IndexVec;
}

/// Every feature is a candidate on every iteration. Used by the
/// determinism property test (§8, property 6), where random sub-sampling
/// would otherwise make two runs incomparable without fixing the seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeatureSubSampling;

impl FeatureSubSampling for NoFeatureSubSampling {
    fn sub_sample(&self, num_features: usize, _rng: &mut dyn Rng) -> IndexVec {
        (0..num_features).collect()
    }
}

/// Draws a fixed-size random subset of feature indices, without
/// replacement, per call.
#[derive(Debug, Clone, Copy)]
pub struct UniformFeatureSubSampling {
    pub sample_size: usize,
}

impl FeatureSubSampling for UniformFeatureSubSampling {
    fn sub_sample(&self, num_features: usize, rng: &mut dyn Rng) -> IndexVec {
        sample_without_replacement(rng, num_features, self.sample_size)
    }
}

/// Produces a weight vector of length `N` per call, one per rule grown.
pub trait InstanceSubSampling: Send + Sync {
    fn sample(&self, num_examples: usize, rng: &mut dyn Rng) -> WeightVector;
}

/// Every example is in-sample with weight `1`. This is the variant
/// exercised by scenarios S1-S6, none of which specify instance bagging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInstanceSubSampling;

impl InstanceSubSampling for NoInstanceSubSampling {
    fn sample(&self, num_examples: usize, _rng: &mut dyn Rng) -> WeightVector {
        WeightVector::ones(num_examples)
    }
}

/// Bootstrap (sampling-with-replacement) instance sub-sampling: draws
/// `num_examples` weighted trials and accumulates a per-example count as
/// its weight, leaving examples never drawn at weight `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaggingInstanceSubSampling;

impl InstanceSubSampling for BaggingInstanceSubSampling {
    fn sample(&self, num_examples: usize, rng: &mut dyn Rng) -> WeightVector {
        use crate::rule_induction::container::uniform_below;
        let mut weights = vec![0.0; num_examples];
        for _ in 0..num_examples {
            let draw = uniform_below(rng, num_examples);
            weights[draw] += 1.0;
        }
        WeightVector::from_weights(weights)
    }
}
