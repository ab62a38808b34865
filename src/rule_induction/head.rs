//! Head refinement (C6): turns a statistics-subset view into a scored head,
//! keeping only the best one found relative to an external floor.

use crate::rule_induction::evaluation::overall_quality_score;
use crate::rule_induction::statistics::StatisticsSubset;

/// A scored candidate head: the single-scalar "+1 covered" prediction this
/// instantiation uses, plus the quality it scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    pub quality: f64,
    pub prediction: Vec<i64>,
}

/// Tracks the best head discovered across a sequence of [`find_head`]
/// calls, each scored against an external floor (the best head known
/// anywhere else in the current sweep). Mirrors this corpus's
/// move-only-ownership style for transient search state: [`poll_head`]
/// takes the stored head, leaving `None` behind.
///
/// [`find_head`]: HeadRefinement::find_head
/// [`poll_head`]: HeadRefinement::poll_head
#[derive(Debug, Default)]
pub struct HeadRefinement {
    best: Option<Head>,
}

impl HeadRefinement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `subset`'s selected prediction vector (`uncovered`,
    /// `accumulated` pick one of its four views) against `ground_truth`.
    /// Stores it as the new best-so-far, and returns `true`, iff it is
    /// strictly better than `current_best_quality` (or that floor is
    /// `None`). A quality-undefined candidate (zero variance) is silently
    /// dropped (§4.2: "the head is rejected").
    pub fn find_head(
        &mut self,
        current_best_quality: Option<f64>,
        subset: &StatisticsSubset,
        ground_truth: &[u32],
        uncovered: bool,
        accumulated: bool,
    ) -> bool {
        let prediction = subset.calculate_label_wise_prediction(uncovered, accumulated);
        let quality = match overall_quality_score(&prediction, ground_truth) {
            Some(q) => q,
            None => return false,
        };
        let is_better = match current_best_quality {
            None => true,
            Some(cb) => quality < cb,
        };
        if is_better {
            self.best = Some(Head { quality, prediction });
        }
        is_better
    }

    /// Take ownership of the last head stored by `find_head`, if any.
    pub fn poll_head(&mut self) -> Option<Head> {
        self.best.take()
    }

    /// The quality of the currently held head, without taking it.
    pub fn peek_quality(&self) -> Option<f64> {
        self.best.as_ref().map(|h| h.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_induction::collaborators::label_matrix::InMemoryLabelMatrix;
    use crate::rule_induction::statistics::LabelWiseStatistics;

    fn subset_with_two_covered(ground_truth_slot0: u32) -> (StatisticsSubset, Vec<u32>) {
        let matrix =
            InMemoryLabelMatrix::new(vec![ground_truth_slot0, 0, 2], vec![0, 0, 1, 1, 2, 2])
                .unwrap();
        let mut stats = LabelWiseStatistics::new(&matrix).unwrap();
        for i in 0..6 {
            stats.add_sampled_statistic(i, 1.0);
        }
        let mut subset = stats.create_subset();
        subset.add_to_subset(&stats, 0);
        subset.add_to_subset(&stats, 1);
        subset.add_to_subset(&stats, 4);
        subset.add_to_subset(&stats, 5);
        (subset, stats.ground_truth().to_vec())
    }

    #[test]
    fn strictly_better_head_is_stored_and_pollable() {
        let (subset, ground_truth) = subset_with_two_covered(2);
        let mut head_refinement = HeadRefinement::new();
        let found = head_refinement.find_head(None, &subset, &ground_truth, false, false);
        assert!(found);
        let head = head_refinement.poll_head().unwrap();
        assert!((head.quality + 1.0).abs() < 1e-9);
        assert!(head_refinement.poll_head().is_none());
    }

    #[test]
    fn a_worse_head_does_not_replace_the_floor() {
        let (subset, ground_truth) = subset_with_two_covered(2);
        let mut head_refinement = HeadRefinement::new();
        let found = head_refinement.find_head(Some(-2.0), &subset, &ground_truth, false, false);
        assert!(!found);
        assert!(head_refinement.poll_head().is_none());
    }

    #[test]
    fn undefined_quality_is_rejected() {
        // Ground truth constant across slots: variance is zero.
        let matrix = InMemoryLabelMatrix::new(vec![1, 1, 1], vec![0, 0, 1, 1, 2, 2]).unwrap();
        let mut stats = LabelWiseStatistics::new(&matrix).unwrap();
        for i in 0..6 {
            stats.add_sampled_statistic(i, 1.0);
        }
        let subset = stats.create_subset();
        let mut head_refinement = HeadRefinement::new();
        let found = head_refinement.find_head(None, &subset, stats.ground_truth(), false, false);
        assert!(!found);
    }
}
