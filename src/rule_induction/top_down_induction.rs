//! Top-down rule induction (C9): the parallel search over sampled features
//! that grows one rule, one condition at a time, and reports whether the
//! grown rule improves on the current quality.
//!
//! The parallel fan-out lives entirely inside [`induce_rule`]: candidate
//! features are searched concurrently via `rayon`, and the best-candidate
//! reduction happens sequentially afterward in feature-index iteration
//! order so the result is deterministic given the same seeds and thread
//! count (§5, §8 property 6).

use rayon::prelude::*;

use crate::rule_induction::collaborators::feature_matrix::FeatureMatrix;
use crate::rule_induction::collaborators::model_builder::ModelBuilder;
use crate::rule_induction::collaborators::nominal_mask::NominalMask;
use crate::rule_induction::collaborators::sub_sampling::FeatureSubSampling;
use crate::rule_induction::container::{Rng, WeightVector};
use crate::rule_induction::model::Condition;
use crate::rule_induction::refinement_search::{Refinement, RuleRefinement};
use crate::rule_induction::statistics::LabelWiseStatistics;
use crate::rule_induction::thresholds::ThresholdsSubsystem;

/// Outcome of one call to [`induce_rule`]: whether a rule was committed and
/// the quality the driver should carry into its next iteration.
pub struct InductionOutcome {
    pub committed: bool,
    pub quality: Option<f64>,
}

/// Options threaded through from [`crate::config::RuleInductionConfig`]
/// that C9 itself consults (the rest are consumed upstream by the driver
/// or by C7/C8).
#[derive(Debug, Clone, Copy)]
pub struct InductionOptions {
    pub max_conditions: i32,
    pub use_leq: bool,
    pub use_neq: bool,
    pub min_coverage: usize,
}

/// Grow one rule by repeated per-feature refinement search, as described in
/// §4.6. `thresholds` and `statistics` are mutated in place: on success the
/// new coverage is applied and one rule is handed to `model_builder`; on
/// failure (`committed == false`) neither is touched beyond the transient
/// per-rule caches `thresholds` already owns (reset on the next call to
/// `start_rule`).
#[allow(clippy::too_many_arguments)]
pub fn induce_rule(
    thresholds: &mut ThresholdsSubsystem,
    statistics: &mut LabelWiseStatistics,
    weights: &WeightVector,
    feature_matrix: &dyn FeatureMatrix,
    nominal_mask: &dyn NominalMask,
    feature_sub_sampling: &dyn FeatureSubSampling,
    rng: &mut dyn Rng,
    model_builder: &mut dyn ModelBuilder,
    options: InductionOptions,
    current_quality: Option<f64>,
) -> InductionOutcome {
    thresholds.start_rule(weights, statistics);

    let num_features = feature_matrix.num_features();
    let mut conditions: Vec<Condition> = Vec::new();
    let mut best_refinement: Option<Refinement> = None;
    let mut found_refinement = true;

    while found_refinement
        && (options.max_conditions == -1 || (conditions.len() as i32) < options.max_conditions)
    {
        found_refinement = false;
        let feature_indices = feature_sub_sampling.sub_sample(num_features, rng);

        // Shared across every candidate feature this iteration: the count
        // of non-zero-weight examples in the currently covered population,
        // which the refinement search needs to size complement conditions
        // (`num_covered_examples` alone would also count zero-weight
        // survivors, see `ThresholdsSubsystem::num_active_covered_examples`).
        let total_active = thresholds.num_active_covered_examples(weights);

        // Build one refinement searcher per candidate feature before the
        // parallel fan-out: the base feature-vector cache and the coverage
        // mask are only ever touched outside the parallel region (§5).
        let searchers: Vec<(usize, RuleRefinement)> = feature_indices
            .iter()
            .map(|&j| {
                let vector = thresholds.filtered_vector(j, feature_matrix).clone();
                let nominal = nominal_mask.is_nominal(j);
                (
                    j,
                    RuleRefinement::new(
                        j,
                        vector,
                        nominal,
                        options.use_leq,
                        options.use_neq,
                        options.min_coverage,
                        total_active,
                    ),
                )
            })
            .collect();

        let current_best_quality = best_refinement.as_ref().map(Refinement::quality);
        // A plain shared reborrow: `&mut LabelWiseStatistics` is never `Sync`,
        // so the parallel fan-out below needs an ordinary shared reference
        // to hand to every worker.
        let stats_ref: &LabelWiseStatistics = statistics;
        let ground_truth = stats_ref.ground_truth();

        // PARALLEL for each candidate feature: read-only with respect to
        // everything except the task's own output.
        let candidates: Vec<(usize, Option<Refinement>)> = searchers
            .into_par_iter()
            .map(|(j, searcher)| {
                let refinement = searcher.find_refinement(
                    current_best_quality,
                    weights,
                    stats_ref,
                    ground_truth,
                );
                (j, refinement)
            })
            .collect();

        // Sequential reduction in feature-index iteration order: ties
        // break in favor of the earlier-evaluated feature (§4.4, §4.6).
        let mut ordered = candidates;
        ordered.sort_by_key(|(j, _)| *j);
        for (feature_index, candidate) in ordered {
            let Some(candidate) = candidate else {
                continue;
            };
            if candidate.is_better_than(best_refinement.as_ref()) {
                tracing::debug!(
                    feature_index,
                    comparator = ?candidate.condition.comparator,
                    threshold = candidate.condition.threshold,
                    num_covered = candidate.condition.num_covered,
                    "candidate condition improves best refinement"
                );
                best_refinement = Some(candidate);
                found_refinement = true;
            }
        }

        if found_refinement {
            let refinement = best_refinement.as_ref().expect("found_refinement implies Some");
            let mut condition = refinement.condition;
            let ascending = refinement.ascending;
            thresholds.filter_thresholds(
                &mut condition,
                ascending,
                weights,
                statistics,
                feature_matrix,
            );
            best_refinement.as_mut().expect("just checked Some").condition = condition;
            conditions.push(condition);
        }
    }

    let Some(refinement) = best_refinement else {
        return InductionOutcome {
            committed: false,
            quality: current_quality,
        };
    };

    let quality = refinement.head.quality;
    let better_than_current = match current_quality {
        None => true,
        Some(cb) => quality < cb,
    };
    if !better_than_current {
        return InductionOutcome {
            committed: false,
            quality: current_quality,
        };
    }

    thresholds.apply_prediction(statistics);

    tracing::info!(
        num_conditions = conditions.len(),
        quality,
        "committed rule"
    );
    model_builder.add_rule(conditions, Some(quality));

    InductionOutcome {
        committed: true,
        quality: Some(quality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_induction::collaborators::feature_matrix::InMemoryFeatureMatrix;
    use crate::rule_induction::collaborators::label_matrix::InMemoryLabelMatrix;
    use crate::rule_induction::collaborators::model_builder::VecModelBuilder;
    use crate::rule_induction::collaborators::nominal_mask::AllNumerical;
    use crate::rule_induction::collaborators::rng::DefaultRng;
    use crate::rule_induction::collaborators::sub_sampling::NoFeatureSubSampling;

    #[test]
    fn s1_perfect_numerical_rule_is_induced() {
        let label_matrix = InMemoryLabelMatrix::new(vec![2, 0, 2], vec![0, 0, 1, 1, 2, 2]).unwrap();
        let mut statistics = LabelWiseStatistics::new(&label_matrix).unwrap();
        let feature_matrix = InMemoryFeatureMatrix::new(vec![
            vec![1.0],
            vec![1.0],
            vec![0.0],
            vec![0.0],
            vec![1.0],
            vec![1.0],
        ]);
        let mut thresholds = ThresholdsSubsystem::new(6);
        let weights = WeightVector::ones(6);
        let mut rng = DefaultRng::seed_from_u64(0);
        let mut model_builder = VecModelBuilder::new();
        let options = InductionOptions {
            max_conditions: 1,
            use_leq: true,
            use_neq: false,
            min_coverage: 0,
        };

        let outcome = induce_rule(
            &mut thresholds,
            &mut statistics,
            &weights,
            &feature_matrix,
            &AllNumerical,
            &NoFeatureSubSampling,
            &mut rng,
            &mut model_builder,
            options,
            None,
        );

        assert!(outcome.committed);
        assert!((outcome.quality.unwrap() + 1.0).abs() < 1e-6);
        assert_eq!(statistics.prediction(), &[2, 0, 2]);

        let model = model_builder.build(0);
        assert_eq!(model.len(), 1);
        let rule = &model.rules[0];
        assert_eq!(rule.conditions.len(), 1);
        assert_eq!(rule.conditions[0].num_covered, 4);
    }

    #[test]
    fn complement_first_condition_produces_a_nonzero_prediction() {
        // The best single condition here is the complement of the direct
        // split: committing it as the rule's only condition must still
        // cover (and predict for) its survivors, not leave them unmarked.
        let label_matrix = InMemoryLabelMatrix::new(vec![0, 1, 0], vec![0, 1, 1, 2, 2, 2]).unwrap();
        let mut statistics = LabelWiseStatistics::new(&label_matrix).unwrap();
        let feature_matrix = InMemoryFeatureMatrix::new(vec![
            vec![9.0],
            vec![1.0],
            vec![1.0],
            vec![9.0],
            vec![9.0],
            vec![9.0],
        ]);
        let mut thresholds = ThresholdsSubsystem::new(6);
        let weights = WeightVector::ones(6);
        let mut rng = DefaultRng::seed_from_u64(0);
        let mut model_builder = VecModelBuilder::new();
        let options = InductionOptions {
            max_conditions: 1,
            use_leq: true,
            use_neq: false,
            min_coverage: 0,
        };

        let outcome = induce_rule(
            &mut thresholds,
            &mut statistics,
            &weights,
            &feature_matrix,
            &AllNumerical,
            &NoFeatureSubSampling,
            &mut rng,
            &mut model_builder,
            options,
            None,
        );

        assert!(outcome.committed);
        assert_eq!(statistics.prediction(), &[0, 2, 0]);
        let model = model_builder.build(0);
        assert!(!model.rules[0].conditions[0].covered);
    }

    #[test]
    fn all_zero_feature_yields_no_commit() {
        let label_matrix = InMemoryLabelMatrix::new(vec![2, 0, 2], vec![0, 0, 1, 1, 2, 2]).unwrap();
        let mut statistics = LabelWiseStatistics::new(&label_matrix).unwrap();
        let feature_matrix = InMemoryFeatureMatrix::new(vec![vec![0.0]; 6]);
        let mut thresholds = ThresholdsSubsystem::new(6);
        let weights = WeightVector::ones(6);
        let mut rng = DefaultRng::seed_from_u64(0);
        let mut model_builder = VecModelBuilder::new();
        let options = InductionOptions {
            max_conditions: -1,
            use_leq: true,
            use_neq: false,
            min_coverage: 0,
        };

        let outcome = induce_rule(
            &mut thresholds,
            &mut statistics,
            &weights,
            &feature_matrix,
            &AllNumerical,
            &NoFeatureSubSampling,
            &mut rng,
            &mut model_builder,
            options,
            None,
        );

        assert!(!outcome.committed);
        assert!(outcome.quality.is_none());
        assert_eq!(model_builder.build(0).len(), 0);
    }

    #[test]
    fn deterministic_given_identical_seed_and_no_sub_sampling() {
        fn run() -> (bool, Option<f64>) {
            let label_matrix =
                InMemoryLabelMatrix::new(vec![2, 0, 2], vec![0, 0, 1, 1, 2, 2]).unwrap();
            let mut statistics = LabelWiseStatistics::new(&label_matrix).unwrap();
            let feature_matrix = InMemoryFeatureMatrix::new(vec![
                vec![1.0, 5.0],
                vec![1.0, 4.0],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
                vec![1.0, 9.0],
                vec![1.0, 8.0],
            ]);
            let mut thresholds = ThresholdsSubsystem::new(6);
            let weights = WeightVector::ones(6);
            let mut rng = DefaultRng::seed_from_u64(42);
            let mut model_builder = VecModelBuilder::new();
            let options = InductionOptions {
                max_conditions: 1,
                use_leq: true,
                use_neq: false,
                min_coverage: 0,
            };
            let outcome = induce_rule(
                &mut thresholds,
                &mut statistics,
                &weights,
                &feature_matrix,
                &AllNumerical,
                &NoFeatureSubSampling,
                &mut rng,
                &mut model_builder,
                options,
                None,
            );
            (outcome.committed, outcome.quality)
        }

        let a = run();
        let b = run();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }
}
