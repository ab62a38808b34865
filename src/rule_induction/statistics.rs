//! Label-wise statistics: the per-time-slot prediction state that drives
//! search (C4), and the per-sweep subset view used by the exact refinement
//! search (C4a).

use crate::error::{Result, RuleInductionError};
use crate::rule_induction::collaborators::label_matrix::LabelMatrix;

/// Per-time-slot covered/uncovered prediction counters, kept for the
/// lifetime of one training run.
///
/// Invariants (§3): `coverage_count` is monotonically non-decreasing;
/// `total_prediction == prediction` whenever no rule is mid-growth;
/// `prediction[t] <= |slot t|`.
#[derive(Debug, Clone)]
pub struct LabelWiseStatistics {
    num_examples: usize,
    time_slot_of: Vec<usize>,
    ground_truth: Vec<u32>,
    /// How many already-committed rules cover example `i`.
    coverage_count: Vec<u32>,
    /// The covered-prediction counts a candidate would produce if nothing
    /// else changed; reset to `prediction` between rules.
    total_prediction: Vec<u32>,
    /// The committed prediction vector: for each slot, the number of
    /// examples in that slot with `coverage_count[i] > 0`.
    prediction: Vec<u32>,
}

impl LabelWiseStatistics {
    /// Build fresh statistics from a label matrix. Fails the contract
    /// violation classified in §7 if the matrix has zero examples or zero
    /// time slots.
    pub fn new(label_matrix: &dyn LabelMatrix) -> Result<Self> {
        let num_examples = label_matrix.num_rows();
        let num_time_slots = label_matrix.num_time_slots();
        if num_examples == 0 || num_time_slots == 0 {
            return Err(RuleInductionError::EmptyLabelMatrix);
        }
        let time_slot_of = (0..num_examples)
            .map(|i| label_matrix.time_slot_of(i))
            .collect();
        Ok(Self {
            num_examples,
            time_slot_of,
            ground_truth: label_matrix.ground_truth().to_vec(),
            coverage_count: vec![0; num_examples],
            total_prediction: vec![0; num_time_slots],
            prediction: vec![0; num_time_slots],
        })
    }

    pub fn num_examples(&self) -> usize {
        self.num_examples
    }

    pub fn num_time_slots(&self) -> usize {
        self.ground_truth.len()
    }

    pub fn ground_truth(&self) -> &[u32] {
        &self.ground_truth
    }

    pub fn prediction(&self) -> &[u32] {
        &self.prediction
    }

    pub fn total_prediction(&self) -> &[u32] {
        &self.total_prediction
    }

    pub fn coverage_count(&self, example: usize) -> u32 {
        self.coverage_count[example]
    }

    pub fn time_slot_of(&self, example: usize) -> usize {
        self.time_slot_of[example]
    }

    /// Copy `prediction` into `total_prediction`; equivalent aliases for
    /// "start growing a new rule" and "a rule was just committed".
    pub fn reset_sampled_statistics(&mut self) {
        self.total_prediction.copy_from_slice(&self.prediction);
    }

    pub fn reset_covered_statistics(&mut self) {
        self.reset_sampled_statistics();
    }

    /// `total_prediction[timeSlot(i)] += 1` iff example `i` is not already
    /// covered by a committed rule. Weight is accepted for interface parity
    /// with `updateCoveredStatistic` (§4.1 notes the two are identical in
    /// this single-label instantiation) but is not itself consumed here.
    pub fn add_sampled_statistic(&mut self, example: usize, _weight: f64) {
        if self.coverage_count[example] == 0 {
            let t = self.time_slot_of[example];
            self.total_prediction[t] += 1;
        }
    }

    /// Tentatively add (`remove = false`) or remove (`remove = true`)
    /// example `i` from the candidate prediction, again gated on
    /// `coverage_count[i] == 0`.
    pub fn update_covered_statistic(&mut self, example: usize, _weight: f64, remove: bool) {
        if self.coverage_count[example] == 0 {
            let t = self.time_slot_of[example];
            if remove {
                self.total_prediction[t] -= 1;
            } else {
                self.total_prediction[t] += 1;
            }
        }
    }

    pub fn increase_coverage_count(&mut self, example: usize) {
        self.coverage_count[example] += 1;
    }

    /// Recompute `prediction[t]` as the number of examples in slot `t` with
    /// `coverage_count[i] > 0`. Called once per committed rule.
    pub fn update_predictions(&mut self) {
        self.prediction.iter_mut().for_each(|p| *p = 0);
        for (i, &count) in self.coverage_count.iter().enumerate() {
            if count > 0 {
                self.prediction[self.time_slot_of[i]] += 1;
            }
        }
    }

    /// A fresh, empty statistics subset scoped to this (single, full) label
    /// set. The label-index projection is a no-op here; the method exists
    /// so head refinement can stay polymorphic over full/partial label sets
    /// without this instantiation special-casing itself.
    pub fn create_subset(&self) -> StatisticsSubset {
        StatisticsSubset::new(&self.total_prediction)
    }
}

/// Per-slot covered/uncovered counters for one candidate split, plus the
/// "accumulated" variants used to score nominal value groups against the
/// union of all groups seen so far.
#[derive(Debug, Clone)]
pub struct StatisticsSubset {
    covered: Vec<i64>,
    uncovered: Vec<i64>,
    accumulated: Option<(Vec<i64>, Vec<i64>)>,
}

impl StatisticsSubset {
    fn new(total_prediction: &[u32]) -> Self {
        Self {
            covered: vec![0; total_prediction.len()],
            uncovered: total_prediction.iter().map(|&v| v as i64).collect(),
            accumulated: None,
        }
    }

    /// `uncovered[timeSlot(i)] -= 1` iff example `i` is not already covered
    /// by a committed rule. Missing examples contribute to neither side of
    /// a split.
    pub fn add_to_missing(&mut self, stats: &LabelWiseStatistics, example: usize) {
        if stats.coverage_count(example) == 0 {
            self.uncovered[stats.time_slot_of(example)] -= 1;
        }
    }

    /// Move example `i` from the uncovered side to the covered side, and
    /// mirror the same delta into the accumulators if they exist.
    pub fn add_to_subset(&mut self, stats: &LabelWiseStatistics, example: usize) {
        if stats.coverage_count(example) == 0 {
            let t = stats.time_slot_of(example);
            self.covered[t] += 1;
            self.uncovered[t] -= 1;
            if let Some((acc_covered, acc_uncovered)) = &mut self.accumulated {
                acc_covered[t] += 1;
                acc_uncovered[t] -= 1;
            }
        }
    }

    /// Snapshot the current (covered, uncovered) into the accumulators on
    /// the first call, then reload (covered, uncovered) from the parent
    /// statistics for the next value group.
    pub fn reset_subset(&mut self, stats: &LabelWiseStatistics) {
        if self.accumulated.is_none() {
            self.accumulated = Some((self.covered.clone(), self.uncovered.clone()));
        }
        self.covered = vec![0; stats.num_time_slots()];
        self.uncovered = stats.total_prediction().iter().map(|&v| v as i64).collect();
    }

    /// Select one of the four vectors for scoring. Falls back to the
    /// non-accumulated vector if no group boundary has been crossed yet
    /// (the accumulators don't exist until the first `reset_subset`).
    pub fn calculate_label_wise_prediction(&self, uncovered: bool, accumulated: bool) -> Vec<i64> {
        if accumulated {
            if let Some((acc_covered, acc_uncovered)) = &self.accumulated {
                return if uncovered {
                    acc_uncovered.clone()
                } else {
                    acc_covered.clone()
                };
            }
        }
        if uncovered {
            self.uncovered.clone()
        } else {
            self.covered.clone()
        }
    }
}
