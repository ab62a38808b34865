//! Thresholds subsystem (C7): the cached, filter-on-refine view that
//! restricts attention to the examples still covered by the partially
//! built rule.
//!
//! This implementation keeps the spec's caching/staleness contract
//! (`cacheFiltered[j]` tagged with the modification count it was built at)
//! but always rebuilds a stale entry the same way regardless of which
//! feature was just committed: by filtering that feature's base vector
//! against the live coverage mask (`FeatureVector::filter`). The spec's
//! `filterCurrentVector` additionally special-cases an in-place, positional
//! update for the just-committed feature; folding that into the generic
//! mask-filter path is simpler and produces the same filtered vector,
//! since the mask is already correct by the time any feature's cache is
//! next requested (see `DESIGN.md`).

use std::collections::HashMap;

use crate::rule_induction::collaborators::feature_matrix::FeatureMatrix;
use crate::rule_induction::container::WeightVector;
use crate::rule_induction::coverage_mask::CoverageMask;
use crate::rule_induction::feature_vector::{FeatureEntry, FeatureVector};
use crate::rule_induction::model::Condition;
use crate::rule_induction::statistics::LabelWiseStatistics;

struct FilteredEntry {
    vector: FeatureVector,
    num_conditions_at_last_filter: u32,
}

/// Owns the base feature-vector cache (kept for the lifetime of training)
/// plus the per-rule filtered-vector cache and coverage mask (reset at the
/// start of every rule).
pub struct ThresholdsSubsystem {
    num_examples: usize,
    cache: HashMap<usize, FeatureVector>,
    cache_filtered: HashMap<usize, FilteredEntry>,
    num_modifications: u32,
    num_covered_examples: usize,
    mask: CoverageMask,
    /// Source of every value ever written into `mask`, both the per-rule
    /// reset and every condition commit's watermark. Never reset across
    /// the lifetime of the subsystem (unlike `num_modifications`, which is
    /// purely a per-rule cache-staleness key), so a watermark written
    /// during one rule can never collide with a stale leftover watermark
    /// from an earlier rule the way two independently-restarting counters
    /// could (see `DESIGN.md`'s note on this).
    mask_watermark: u32,
}

impl ThresholdsSubsystem {
    pub fn new(num_examples: usize) -> Self {
        Self {
            num_examples,
            cache: HashMap::new(),
            cache_filtered: HashMap::new(),
            num_modifications: 0,
            num_covered_examples: num_examples,
            mask: CoverageMask::new(num_examples),
            mask_watermark: 0,
        }
    }

    pub fn num_covered_examples(&self) -> usize {
        self.num_covered_examples
    }

    /// Count of non-zero-weight ("active") examples in the currently
    /// covered population. Distinct from `num_covered_examples`, which
    /// counts the raw covered population regardless of weight and is what
    /// `apply_prediction` sums coverage over -- a sampling round's
    /// zero-weight examples are still classified once a rule commits, but
    /// must not inflate the complement counts the refinement search scores
    /// candidates against.
    pub fn num_active_covered_examples(&self, weights: &WeightVector) -> usize {
        (0..self.num_examples)
            .filter(|&i| self.mask.is_covered(i) && weights.is_active(i))
            .count()
    }

    pub fn num_modifications(&self) -> u32 {
        self.num_modifications
    }

    /// `createSubset(weights)`: install the sampled weights into the live
    /// statistics and reset the per-rule caches/mask for a fresh rule.
    pub fn start_rule(&mut self, weights: &WeightVector, statistics: &mut LabelWiseStatistics) {
        statistics.reset_sampled_statistics();
        for i in 0..weights.len() {
            if weights.is_active(i) {
                statistics.add_sampled_statistic(i, weights.weight(i));
            }
        }
        self.reset_thresholds();
    }

    /// Clears the filtered cache, zeroes `num_modifications`, and bumps the
    /// coverage mask to a fresh, never-before-used generation with every
    /// example marked covered under it: the empty rule body trivially
    /// covers the whole population, and `filter_thresholds`'s complement
    /// branch (below) needs that population already marked before the
    /// rule's first condition can narrow it.
    pub fn reset_thresholds(&mut self) {
        self.cache_filtered.clear();
        self.num_modifications = 0;
        self.num_covered_examples = self.num_examples;
        self.mask_watermark += 1;
        let watermark = self.mask_watermark;
        self.mask.set_target(watermark);
        for example in 0..self.num_examples {
            self.mask.mark(example, watermark);
        }
    }

    fn base_vector(&mut self, feature_index: usize, feature_matrix: &dyn FeatureMatrix) -> &FeatureVector {
        self.cache.entry(feature_index).or_insert_with(|| {
            tracing::debug!(feature_index, "fetching and sorting base feature vector (cache miss)");
            FeatureVector::from_raw(feature_matrix.fetch_feature_vector(feature_index))
        })
    }

    /// The callback C8 uses to obtain feature `j`'s currently-filtered
    /// vector: returns the cached entry if it is up to date, otherwise
    /// rebuilds it from the base vector and the live coverage mask.
    pub fn filtered_vector(
        &mut self,
        feature_index: usize,
        feature_matrix: &dyn FeatureMatrix,
    ) -> &FeatureVector {
        let up_to_date = self
            .cache_filtered
            .get(&feature_index)
            .is_some_and(|e| e.num_conditions_at_last_filter == self.num_modifications);
        if !up_to_date {
            self.base_vector(feature_index, feature_matrix);
            let base = &self.cache[&feature_index];
            let filtered = if self.num_modifications == 0 {
                base.clone()
            } else {
                let mask = &self.mask;
                base.filter(|i| mask.is_covered(i as usize))
            };
            self.cache_filtered.insert(
                feature_index,
                FilteredEntry {
                    vector: filtered,
                    num_conditions_at_last_filter: self.num_modifications,
                },
            );
        }
        &self.cache_filtered[&feature_index].vector
    }

    /// `filterThresholds(refinement)`: commit a condition. Applies the
    /// zero-weight split adjustment first if needed, then bumps
    /// `num_modifications`, marks the coverage mask, and updates the live
    /// statistics (§4.5's `filterCurrentVector` policy). Corrects
    /// `condition.num_covered` to the exact count this adjusted span marks.
    pub fn filter_thresholds(
        &mut self,
        condition: &mut Condition,
        ascending: bool,
        weights: &WeightVector,
        statistics: &mut LabelWiseStatistics,
        feature_matrix: &dyn FeatureMatrix,
    ) {
        let active_vector = self.filtered_vector(condition.feature_index, feature_matrix).clone();

        if weights.has_zero_weights() && condition.previous.abs_diff(condition.end) > 1 {
            adjust_split(active_vector.entries(), condition, ascending);
        }

        self.num_modifications += 1;
        self.mask_watermark += 1;
        let watermark = self.mask_watermark;
        let entries = active_vector.entries();

        // A direct `covered` condition redefines the entire covered set to
        // exactly its span (a fresh `target`, marking only the kept span),
        // so anything the span doesn't explicitly include -- other
        // entries, missing, or an implicit sparse zero for this feature --
        // falls out of coverage automatically. A complement condition
        // instead marks only what it newly excludes and leaves `target`
        // alone, since the survivors are already marked covered -- by
        // `reset_thresholds` if this is the rule's first condition, or by
        // whichever earlier condition last redefined `target` otherwise
        // (see `coverage_mask`'s module docs).
        let mut marked = 0_u32;
        if condition.covered {
            self.mask.set_target(watermark);
            statistics.reset_covered_statistics();
            let positions: Vec<usize> = if condition.end >= condition.start {
                (condition.start..condition.end).collect()
            } else {
                (condition.end..condition.start).rev().collect()
            };
            for pos in positions {
                let example_index = entries[pos].example_index as usize;
                self.mask.mark(example_index, watermark);
                statistics.update_covered_statistic(example_index, weights.weight(example_index), false);
                marked += 1;
            }
        } else {
            let (lo, hi) = if condition.start <= condition.end {
                (condition.start, condition.end)
            } else {
                (condition.end, condition.start)
            };
            for pos in lo..hi {
                let example_index = entries[pos].example_index as usize;
                self.mask.mark(example_index, watermark);
                statistics.update_covered_statistic(example_index, weights.weight(example_index), true);
            }
            marked = (entries.len() - (hi - lo)) as u32;
        }

        for &missing_index in active_vector.missing() {
            self.mask.mark(missing_index as usize, watermark);
            statistics.update_covered_statistic(missing_index as usize, weights.weight(missing_index as usize), true);
        }

        condition.num_covered = marked;
        self.num_covered_examples = marked as usize;
    }

    /// `applyPrediction(bestHead)`: once a rule's body is fully grown, bump
    /// `coverageCount` for every example the coverage mask currently marks
    /// as covered (i.e. satisfies every committed condition) and recompute
    /// the committed prediction vector. Called exactly once per committed
    /// rule, after the last `filterThresholds` call (§4.6).
    pub fn apply_prediction(&self, statistics: &mut LabelWiseStatistics) {
        for example in 0..self.num_examples {
            if self.mask.is_covered(example) {
                statistics.increase_coverage_count(example);
            }
        }
        statistics.update_predictions();
    }
}

/// Walk from `condition.end` toward `condition.previous`, extending the
/// span over any zero-weight example whose raw value still falls on the
/// committed threshold's side, so the mask/statistics update reflects
/// where the example actually belongs rather than where the (weight-blind)
/// search left it. A no-op when the gap is `<= 1` (nothing to adjust) --
/// callers should check that themselves, matching §4.5's gating
/// condition.
pub fn adjust_split(entries: &[FeatureEntry], condition: &mut Condition, ascending: bool) {
    let step: isize = if ascending { 1 } else { -1 };
    let stop = condition.previous as isize;
    let mut candidate = condition.end as isize;
    let mut adjusted_end = condition.end;
    while candidate != stop {
        if candidate < 0 || candidate as usize >= entries.len() {
            break;
        }
        let value = entries[candidate as usize].value;
        let satisfies = if ascending {
            value <= condition.threshold
        } else {
            value > condition.threshold
        };
        if !satisfies {
            break;
        }
        adjusted_end = if ascending {
            candidate as usize + 1
        } else {
            candidate as usize
        };
        candidate += step;
    }
    condition.end = adjusted_end;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_induction::collaborators::feature_matrix::InMemoryFeatureMatrix;
    use crate::rule_induction::collaborators::label_matrix::InMemoryLabelMatrix;
    use crate::rule_induction::model::Comparator;

    fn matrix_6() -> InMemoryLabelMatrix {
        InMemoryLabelMatrix::new(vec![2, 0, 2], vec![0, 0, 1, 1, 2, 2]).unwrap()
    }

    fn condition(
        comparator: Comparator,
        threshold: f32,
        start: usize,
        end: usize,
        covered: bool,
    ) -> Condition {
        Condition {
            feature_index: 0,
            comparator,
            threshold,
            num_covered: 0,
            covered,
            start,
            end,
            previous: end,
        }
    }

    #[test]
    fn first_access_is_unfiltered_clone_of_base() {
        let features = InMemoryFeatureMatrix::new(vec![
            vec![1.0],
            vec![1.0],
            vec![0.0],
            vec![0.0],
            vec![1.0],
            vec![1.0],
        ]);
        let mut subsystem = ThresholdsSubsystem::new(6);
        let vector = subsystem.filtered_vector(0, &features);
        assert_eq!(vector.entries().len(), 4);
    }

    #[test]
    fn committing_a_covered_condition_narrows_subsequent_fetches() {
        let label_matrix = matrix_6();
        let mut stats = LabelWiseStatistics::new(&label_matrix).unwrap();
        let features = InMemoryFeatureMatrix::new(vec![
            vec![1.0, 5.0],
            vec![1.0, 5.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, 9.0],
            vec![1.0, 9.0],
        ]);
        let weights = WeightVector::ones(6);
        let mut subsystem = ThresholdsSubsystem::new(6);
        subsystem.start_rule(&weights, &mut stats);

        // feature 0 sorted: [(1,0),(1,1),(1,4),(1,5)] (the zeros are sparse).
        let base_len = subsystem.filtered_vector(0, &features).entries().len();
        assert_eq!(base_len, 4);

        // Commit `f0 > 0.5` covering everyone with a non-zero f0 (all 4).
        let mut cond = condition(Comparator::Gr, 0.5, 0, 4, true);
        subsystem.filter_thresholds(&mut cond, true, &weights, &mut stats, &features);
        assert_eq!(cond.num_covered, 4);

        // Feature 1 must now be rebuilt against the narrowed mask; since
        // every surviving example is still covered, it keeps all entries
        // with a non-zero f1 value among the covered four.
        let narrowed = subsystem.filtered_vector(1, &features);
        assert_eq!(narrowed.entries().len(), 4);
    }

    #[test]
    fn uncovered_complement_excludes_the_span() {
        let label_matrix = matrix_6();
        let mut stats = LabelWiseStatistics::new(&label_matrix).unwrap();
        let features = InMemoryFeatureMatrix::new(vec![
            vec![1.0],
            vec![1.0],
            vec![2.0],
            vec![2.0],
            vec![3.0],
            vec![3.0],
        ]);
        let weights = WeightVector::ones(6);
        let mut subsystem = ThresholdsSubsystem::new(6);
        subsystem.start_rule(&weights, &mut stats);
        subsystem.filtered_vector(0, &features);

        // Sorted: [(1,0),(1,1),(2,2),(2,3),(3,4),(3,5)]. Exclude [0,2)
        // (value 1.0) via the complement of a LEQ split.
        let mut cond = condition(Comparator::Gr, 1.5, 0, 2, false);
        subsystem.filter_thresholds(&mut cond, true, &weights, &mut stats, &features);
        assert_eq!(cond.num_covered, 4);
        assert_eq!(subsystem.num_covered_examples(), 4);
    }

    #[test]
    fn complement_as_first_condition_still_marks_survivors_covered() {
        // A rule whose sole condition is a complement must leave the mask
        // agreeing with `num_covered`: every survivor actually satisfies
        // `is_covered`, not just the bookkeeping count.
        let label_matrix = matrix_6();
        let mut stats = LabelWiseStatistics::new(&label_matrix).unwrap();
        let features = InMemoryFeatureMatrix::new(vec![
            vec![1.0],
            vec![1.0],
            vec![2.0],
            vec![2.0],
            vec![3.0],
            vec![3.0],
        ]);
        let weights = WeightVector::ones(6);
        let mut subsystem = ThresholdsSubsystem::new(6);
        subsystem.start_rule(&weights, &mut stats);
        subsystem.filtered_vector(0, &features);

        // Sorted: [(1,0),(1,1),(2,2),(2,3),(3,4),(3,5)]. Exclude [0,2)
        // (value 1.0) via the complement of a LEQ split, as this rule's
        // only (first) condition.
        let mut cond = condition(Comparator::Gr, 1.5, 0, 2, false);
        subsystem.filter_thresholds(&mut cond, true, &weights, &mut stats, &features);
        subsystem.apply_prediction(&mut stats);

        assert_eq!(stats.coverage_count(0), 0);
        assert_eq!(stats.coverage_count(1), 0);
        assert_eq!(stats.coverage_count(2), 1);
        assert_eq!(stats.coverage_count(3), 1);
        assert_eq!(stats.coverage_count(4), 1);
        assert_eq!(stats.coverage_count(5), 1);
    }

    #[test]
    fn num_active_covered_examples_excludes_zero_weight_survivors() {
        // Examples 4 and 5 are sub-sampled out (zero weight) but still
        // covered by the rule body; the active count used to size
        // complement splits must not count them.
        let label_matrix = matrix_6();
        let mut stats = LabelWiseStatistics::new(&label_matrix).unwrap();
        let features = InMemoryFeatureMatrix::new(vec![
            vec![1.0],
            vec![1.0],
            vec![1.0],
            vec![1.0],
            vec![1.0],
            vec![1.0],
        ]);
        let weights = WeightVector::from_weights(vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        let mut subsystem = ThresholdsSubsystem::new(6);
        subsystem.start_rule(&weights, &mut stats);

        assert_eq!(subsystem.num_covered_examples(), 6);
        assert_eq!(subsystem.num_active_covered_examples(&weights), 4);
    }

    #[test]
    fn adjust_split_is_idempotent() {
        let entries = vec![
            FeatureEntry { value: -2.0, example_index: 0 },
            FeatureEntry { value: -1.0, example_index: 1 },
            FeatureEntry { value: 0.5, example_index: 2 },
            FeatureEntry { value: 1.0, example_index: 3 },
            FeatureEntry { value: 2.0, example_index: 4 },
        ];
        let mut cond = condition(Comparator::Leq, 0.25, 0, 2, true);
        cond.previous = 3;
        adjust_split(&entries, &mut cond, true);
        let first_pass_end = cond.end;
        adjust_split(&entries, &mut cond, true);
        assert_eq!(cond.end, first_pass_end);
    }

    #[test]
    fn adjust_split_leaves_end_unchanged_when_gap_is_one() {
        // Matches S6: the single zero-weight example between `end` and
        // `previous` sits on the wrong side of the threshold, and the gate
        // in `filter_thresholds` never even calls `adjust_split` when the
        // gap is 1; here we exercise `adjust_split` directly to show it
        // would also be a no-op via the predicate failing immediately.
        let entries = vec![
            FeatureEntry { value: -2.0, example_index: 0 },
            FeatureEntry { value: -1.0, example_index: 1 },
            FeatureEntry { value: 0.5, example_index: 2 },
            FeatureEntry { value: 1.0, example_index: 3 },
            FeatureEntry { value: 2.0, example_index: 4 },
        ];
        let mut cond = condition(Comparator::Leq, 0.25, 0, 2, true);
        cond.previous = 3;
        adjust_split(&entries, &mut cond, true);
        assert_eq!(cond.end, 2);
    }
}
