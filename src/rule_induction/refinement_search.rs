//! Exact per-feature refinement search (C8): sweeps one feature's sorted
//! vector in four phases to find the single best split for that feature.
//!
//! Read-only with respect to all shared state: a [`RuleRefinement`] owns a
//! private clone of the feature's currently-filtered vector and only reads
//! the statistics/weights it is handed, so a pool of them can be driven
//! concurrently (§5's "per-refinement objects: each task writes only to its
//! own refinement object").

use crate::rule_induction::container::WeightVector;
use crate::rule_induction::feature_vector::{FeatureEntry, FeatureVector};
use crate::rule_induction::head::{Head, HeadRefinement};
use crate::rule_induction::model::{Comparator, Condition};
use crate::rule_induction::statistics::{LabelWiseStatistics, StatisticsSubset};

/// A scored (condition, head) pair discovered by one feature's sweep, plus
/// the sweep direction that produced it. `ascending` is not part of the
/// committed model (§3's Condition tuple omits it); it exists only so the
/// caller can pass the right direction into
/// [`crate::rule_induction::thresholds::ThresholdsSubsystem::filter_thresholds`]'s
/// zero-weight split adjustment (§4.5).
#[derive(Debug, Clone)]
pub struct Refinement {
    pub condition: Condition,
    pub head: Head,
    pub ascending: bool,
}

impl Refinement {
    pub fn quality(&self) -> f64 {
        self.head.quality
    }

    /// An initially-empty refinement compares as `+inf`: everything beats it.
    pub fn is_better_than(&self, other: Option<&Refinement>) -> bool {
        match other {
            None => true,
            Some(o) => self.quality() < o.quality(),
        }
    }
}

fn comparator_allowed(comparator: Comparator, use_leq: bool, use_neq: bool) -> bool {
    match comparator {
        Comparator::Leq => use_leq,
        Comparator::Neq => use_neq,
        Comparator::Gr | Comparator::Eq => true,
    }
}

/// Per-phase bookkeeping handed back to the caller so phases C/D can tell
/// whether there is a gap to bridge.
#[derive(Debug, Clone, Copy, Default)]
struct PhaseOutcome {
    active_count: usize,
    last_active_value: Option<f32>,
}

/// One feature's private view into the search: its filtered vector plus the
/// config needed to gate and score candidate splits. Constructed once per
/// induction iteration, before the parallel fan-out (§5: the base vector is
/// only touched outside the parallel region).
pub struct RuleRefinement {
    feature_index: usize,
    vector: FeatureVector,
    nominal: bool,
    use_leq: bool,
    use_neq: bool,
    min_coverage: usize,
    /// Active (non-zero-weight) examples in the currently covered
    /// population, including implicit sparse zeros but excluding missing.
    total_active: usize,
}

impl RuleRefinement {
    pub fn new(
        feature_index: usize,
        vector: FeatureVector,
        nominal: bool,
        use_leq: bool,
        use_neq: bool,
        min_coverage: usize,
        total_active: usize,
    ) -> Self {
        Self {
            feature_index,
            vector,
            nominal,
            use_leq,
            use_neq,
            min_coverage,
            total_active,
        }
    }

    /// Sweep this feature's vector and return the single best refinement
    /// found, if any beats `current_best_quality`.
    pub fn find_refinement(
        &self,
        current_best_quality: Option<f64>,
        weights: &WeightVector,
        statistics: &LabelWiseStatistics,
        ground_truth: &[u32],
    ) -> Option<Refinement> {
        let entries = self.vector.entries();
        let neg_end = entries.partition_point(|e| e.value < 0.0);

        let mut subset = statistics.create_subset();
        for &m in self.vector.missing() {
            subset.add_to_missing(statistics, m);
        }

        let mut head_refinement = HeadRefinement::new();
        let mut floor = current_best_quality;
        let mut best_condition: Option<(Condition, bool)> = None;

        let neg_outcome = self.sweep_phase(
            entries,
            0..neg_end,
            true,
            weights,
            ground_truth,
            statistics,
            &mut subset,
            &mut head_refinement,
            &mut floor,
            &mut best_condition,
        );
        let nonneg_outcome = self.sweep_phase(
            entries,
            (neg_end..entries.len()).rev(),
            false,
            weights,
            ground_truth,
            statistics,
            &mut subset,
            &mut head_refinement,
            &mut floor,
            &mut best_condition,
        );

        self.phase_c(
            &neg_outcome,
            &nonneg_outcome,
            weights,
            ground_truth,
            &subset,
            &mut head_refinement,
            &mut floor,
            &mut best_condition,
        );
        self.phase_d(
            &neg_outcome,
            &nonneg_outcome,
            neg_end,
            entries.len(),
            weights,
            statistics,
            ground_truth,
            &mut head_refinement,
            &mut floor,
            &mut best_condition,
        );

        let (condition, ascending) = best_condition?;
        let head = head_refinement.poll_head()?;
        Some(Refinement { condition, head, ascending })
    }

    #[allow(clippy::too_many_arguments)]
    fn sweep_phase(
        &self,
        entries: &[FeatureEntry],
        positions: impl Iterator<Item = usize>,
        ascending: bool,
        weights: &WeightVector,
        ground_truth: &[u32],
        statistics: &LabelWiseStatistics,
        subset: &mut StatisticsSubset,
        head_refinement: &mut HeadRefinement,
        floor: &mut Option<f64>,
        best_condition: &mut Option<(Condition, bool)>,
    ) -> PhaseOutcome {
        let mut cumulative_count = 0_usize;
        let mut group_count = 0_usize;
        let mut phase_start_pos: Option<usize> = None;
        let mut group_start_pos: Option<usize> = None;
        let mut last_active_pos: Option<usize> = None;
        let mut prev_value: Option<f32> = None;

        let comparator_direct = if self.nominal {
            Comparator::Eq
        } else if ascending {
            Comparator::Leq
        } else {
            Comparator::Gr
        };
        let comparator_complement = if self.nominal {
            Comparator::Neq
        } else if ascending {
            Comparator::Gr
        } else {
            Comparator::Leq
        };

        for pos in positions {
            let entry = entries[pos];
            if !weights.is_active(entry.example_index) {
                continue;
            }
            if let Some(pv) = prev_value {
                if entry.value != pv {
                    let range_start = if self.nominal {
                        group_start_pos.expect("prev_value set implies group_start_pos set")
                    } else {
                        phase_start_pos.expect("prev_value set implies phase_start_pos set")
                    };
                    let (start, end) = span(
                        ascending,
                        range_start,
                        last_active_pos.expect("prev_value set implies last_active_pos set"),
                    );
                    let num_covered = if self.nominal { group_count } else { cumulative_count };
                    let threshold = if self.nominal { pv } else { (pv + entry.value) / 2.0 };

                    if comparator_allowed(comparator_direct, self.use_leq, self.use_neq)
                        && num_covered >= self.min_coverage
                    {
                        let condition = Condition {
                            feature_index: self.feature_index,
                            comparator: comparator_direct,
                            threshold,
                            num_covered: num_covered as u32,
                            covered: true,
                            start,
                            end,
                            previous: pos,
                        };
                        try_commit(head_refinement, floor, best_condition, subset, ground_truth, false, condition, ascending);
                    }
                    if comparator_allowed(comparator_complement, self.use_leq, self.use_neq) {
                        let complement_covered = self.total_active.saturating_sub(num_covered);
                        if complement_covered >= self.min_coverage {
                            let condition = Condition {
                                feature_index: self.feature_index,
                                comparator: comparator_complement,
                                threshold,
                                num_covered: complement_covered as u32,
                                covered: false,
                                start,
                                end,
                                previous: pos,
                            };
                            try_commit(head_refinement, floor, best_condition, subset, ground_truth, true, condition, ascending);
                        }
                    }
                    if self.nominal {
                        subset.reset_subset(statistics);
                        group_start_pos = Some(pos);
                        group_count = 0;
                    }
                }
            } else {
                phase_start_pos = Some(pos);
                group_start_pos = Some(pos);
            }
            subset.add_to_subset(statistics, entry.example_index as usize);
            cumulative_count += 1;
            group_count += 1;
            last_active_pos = Some(pos);
            prev_value = Some(entry.value);
        }

        if self.nominal {
            if let (Some(group_start), Some(last_pos), Some(pv)) =
                (group_start_pos, last_active_pos, prev_value)
            {
                let (start, end) = span(ascending, group_start, last_pos);
                if group_count >= self.min_coverage {
                    let condition = Condition {
                        feature_index: self.feature_index,
                        comparator: Comparator::Eq,
                        threshold: pv,
                        num_covered: group_count as u32,
                        covered: true,
                        start,
                        end,
                        previous: end,
                    };
                    try_commit(head_refinement, floor, best_condition, subset, ground_truth, false, condition, ascending);
                }
                if self.use_neq {
                    let complement_covered = self.total_active.saturating_sub(group_count);
                    if complement_covered >= self.min_coverage {
                        let condition = Condition {
                            feature_index: self.feature_index,
                            comparator: Comparator::Neq,
                            threshold: pv,
                            num_covered: complement_covered as u32,
                            covered: false,
                            start,
                            end,
                            previous: end,
                        };
                        try_commit(head_refinement, floor, best_condition, subset, ground_truth, true, condition, ascending);
                    }
                }
            }
        }

        PhaseOutcome {
            active_count: cumulative_count,
            last_active_value: prev_value,
        }
    }

    /// Sparse-zero bridge: scores `f != 0` / nominal `f != 0`-equivalent on
    /// the subset phases A+B already fully accumulated (every explicit
    /// non-zero active example), and its complement (the implicit sparse
    /// zeros) via the same subset's uncovered view.
    #[allow(clippy::too_many_arguments)]
    fn phase_c(
        &self,
        neg_outcome: &PhaseOutcome,
        nonneg_outcome: &PhaseOutcome,
        weights: &WeightVector,
        ground_truth: &[u32],
        subset: &StatisticsSubset,
        head_refinement: &mut HeadRefinement,
        floor: &mut Option<f64>,
        best_condition: &mut Option<(Condition, bool)>,
    ) {
        let missing_active = self
            .vector
            .missing()
            .iter()
            .filter(|&&m| weights.is_active(m))
            .count();
        let explicit_active = neg_outcome.active_count + nonneg_outcome.active_count;
        let active_population = self.total_active.saturating_sub(missing_active);
        if explicit_active >= active_population {
            return;
        }
        let sparse_zero_active = active_population - explicit_active;
        let prev = nonneg_outcome.last_active_value.unwrap_or(0.0);

        let (comparator_direct, threshold) = if self.nominal {
            (Comparator::Neq, 0.0)
        } else {
            (Comparator::Gr, prev / 2.0)
        };
        if comparator_allowed(comparator_direct, self.use_leq, self.use_neq)
            && explicit_active >= self.min_coverage
        {
            let condition = Condition {
                feature_index: self.feature_index,
                comparator: comparator_direct,
                threshold,
                num_covered: explicit_active as u32,
                covered: true,
                start: 0,
                end: self.vector.entries().len(),
                previous: self.vector.entries().len(),
            };
            try_commit(head_refinement, floor, best_condition, subset, ground_truth, false, condition, true);
        }

        let comparator_complement = if self.nominal { Comparator::Eq } else { Comparator::Leq };
        if comparator_allowed(comparator_complement, self.use_leq, self.use_neq)
            && sparse_zero_active >= self.min_coverage
        {
            let condition = Condition {
                feature_index: self.feature_index,
                comparator: comparator_complement,
                threshold,
                num_covered: sparse_zero_active as u32,
                covered: false,
                start: 0,
                end: self.vector.entries().len(),
                previous: self.vector.entries().len(),
            };
            try_commit(head_refinement, floor, best_condition, subset, ground_truth, true, condition, true);
        }
    }

    /// Numerical-only bridge between the negative prefix and non-negative
    /// suffix: scores each side on its own freshly built subset (phases A/B
    /// left the shared subset holding *both* sides together, which Phase D
    /// cannot reuse directly).
    #[allow(clippy::too_many_arguments)]
    fn phase_d(
        &self,
        neg_outcome: &PhaseOutcome,
        nonneg_outcome: &PhaseOutcome,
        neg_end: usize,
        entries_len: usize,
        weights: &WeightVector,
        statistics: &LabelWiseStatistics,
        ground_truth: &[u32],
        head_refinement: &mut HeadRefinement,
        floor: &mut Option<f64>,
        best_condition: &mut Option<(Condition, bool)>,
    ) {
        let (Some(last_negative), Some(first_non_negative)) =
            (neg_outcome.last_active_value, nonneg_outcome.last_active_value)
        else {
            return;
        };
        if neg_outcome.active_count == 0 || nonneg_outcome.active_count == 0 {
            return;
        }
        let sparse_zero_between = self
            .vector
            .entries()
            .iter()
            .take(entries_len)
            .filter(|e| weights.is_active(e.example_index))
            .count()
            < self.total_active - self.vector.missing().iter().filter(|&&m| weights.is_active(m)).count();
        let threshold = if sparse_zero_between {
            last_negative / 2.0
        } else {
            (last_negative + first_non_negative) / 2.0
        };

        let mut bridge_subset = statistics.create_subset();
        for &m in self.vector.missing() {
            bridge_subset.add_to_missing(statistics, m);
        }
        for entry in &self.vector.entries()[..neg_end] {
            if weights.is_active(entry.example_index) {
                bridge_subset.add_to_subset(statistics, entry.example_index as usize);
            }
        }

        if self.use_leq && neg_outcome.active_count >= self.min_coverage {
            let condition = Condition {
                feature_index: self.feature_index,
                comparator: Comparator::Leq,
                threshold,
                num_covered: neg_outcome.active_count as u32,
                covered: true,
                start: 0,
                end: neg_end,
                previous: neg_end,
            };
            try_commit(head_refinement, floor, best_condition, &bridge_subset, ground_truth, false, condition, true);
        }
        if nonneg_outcome.active_count >= self.min_coverage {
            let condition = Condition {
                feature_index: self.feature_index,
                comparator: Comparator::Gr,
                threshold,
                num_covered: nonneg_outcome.active_count as u32,
                covered: true,
                start: neg_end,
                end: entries_len,
                previous: neg_end,
            };
            try_commit(head_refinement, floor, best_condition, &bridge_subset, ground_truth, true, condition, false);
        }
    }
}

/// Absolute `(start, end)` span, `end` exclusive on the high side for an
/// ascending sweep and on the low side for a descending one (matching
/// `ThresholdsSubsystem`'s "descending iteration when `end < start`"
/// convention).
fn span(ascending: bool, range_start_pos: usize, last_active_pos: usize) -> (usize, usize) {
    if ascending {
        (range_start_pos, last_active_pos + 1)
    } else {
        (range_start_pos + 1, last_active_pos)
    }
}

#[allow(clippy::too_many_arguments)]
fn try_commit(
    head_refinement: &mut HeadRefinement,
    floor: &mut Option<f64>,
    best_condition: &mut Option<(Condition, bool)>,
    subset: &StatisticsSubset,
    ground_truth: &[u32],
    uncovered: bool,
    condition: Condition,
    ascending: bool,
) {
    let improved = head_refinement.find_head(*floor, subset, ground_truth, uncovered, false);
    if improved {
        *floor = head_refinement.peek_quality();
        *best_condition = Some((condition, ascending));
    }
}
