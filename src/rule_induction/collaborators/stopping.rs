//! Stopping-criteria collaborator (§6): `test(partition, statistics,
//! numRules) -> {CONTINUE, STORE_STOP(k), FORCE_STOP(k)}`.

use crate::rule_induction::statistics::LabelWiseStatistics;

/// The training/holdout partition the driver samples once (§4.7, item 3).
/// This crate ships only the trivial "everything is training" partition;
/// holdout-based stopping criteria are an external collaborator concern.
#[derive(Debug, Clone)]
pub struct Partition {
    training: Vec<usize>,
}

impl Partition {
    pub fn training_only(num_examples: usize) -> Self {
        Self {
            training: (0..num_examples).collect(),
        }
    }

    pub fn training_examples(&self) -> &[usize] {
        &self.training
    }
}

/// A stopping criterion's verdict. `ForceStop` always wins; `StoreStop` is
/// latched once by the driver and carries the rule count at first latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppingDecision {
    Continue,
    StoreStop(usize),
    ForceStop(usize),
}

pub trait StoppingCriterion: Send + Sync {
    fn test(
        &self,
        partition: &Partition,
        statistics: &LabelWiseStatistics,
        num_rules: usize,
    ) -> StoppingDecision;
}

/// Stops (via `StoreStop`) once `num_rules == max_rules`; matches S5.
#[derive(Debug, Clone, Copy)]
pub struct MaxRulesStoppingCriterion {
    pub max_rules: usize,
}

impl StoppingCriterion for MaxRulesStoppingCriterion {
    fn test(
        &self,
        _partition: &Partition,
        _statistics: &LabelWiseStatistics,
        num_rules: usize,
    ) -> StoppingDecision {
        if num_rules >= self.max_rules {
            StoppingDecision::StoreStop(num_rules)
        } else {
            StoppingDecision::Continue
        }
    }
}

/// Never asks to stop; pair with an external, time-based criterion (or
/// `MaxRulesStoppingCriterion`) to guarantee termination.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStoppingCriterion;

impl StoppingCriterion for NoStoppingCriterion {
    fn test(
        &self,
        _partition: &Partition,
        _statistics: &LabelWiseStatistics,
        _num_rules: usize,
    ) -> StoppingDecision {
        StoppingDecision::Continue
    }
}

/// Combines multiple criteria: the first `ForceStop` wins outright; the
/// first `StoreStop` is remembered but later criteria may still return
/// `Continue` (matching S5's "latches once, then CONTINUE for 5 more").
pub struct CompositeStoppingCriterion {
    criteria: Vec<Box<dyn StoppingCriterion>>,
}

impl CompositeStoppingCriterion {
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion>>) -> Self {
        Self { criteria }
    }
}

impl StoppingCriterion for CompositeStoppingCriterion {
    fn test(
        &self,
        partition: &Partition,
        statistics: &LabelWiseStatistics,
        num_rules: usize,
    ) -> StoppingDecision {
        let mut store_stop = None;
        for criterion in &self.criteria {
            match criterion.test(partition, statistics, num_rules) {
                StoppingDecision::ForceStop(k) => return StoppingDecision::ForceStop(k),
                StoppingDecision::StoreStop(k) => store_stop.get_or_insert(k),
                StoppingDecision::Continue => continue,
            };
        }
        match store_stop {
            Some(k) => StoppingDecision::StoreStop(k),
            None => StoppingDecision::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_induction::collaborators::label_matrix::InMemoryLabelMatrix;

    fn stats() -> LabelWiseStatistics {
        let matrix = InMemoryLabelMatrix::new(vec![1, 1], vec![0, 1]).unwrap();
        LabelWiseStatistics::new(&matrix).unwrap()
    }

    #[test]
    fn max_rules_latches_store_stop_at_threshold() {
        let criterion = MaxRulesStoppingCriterion { max_rules: 3 };
        let partition = Partition::training_only(2);
        let s = stats();
        assert_eq!(
            criterion.test(&partition, &s, 2),
            StoppingDecision::Continue
        );
        assert_eq!(
            criterion.test(&partition, &s, 3),
            StoppingDecision::StoreStop(3)
        );
    }

    #[test]
    fn composite_prefers_force_stop_over_store_stop() {
        struct AlwaysForceStop;
        impl StoppingCriterion for AlwaysForceStop {
            fn test(&self, _: &Partition, _: &LabelWiseStatistics, n: usize) -> StoppingDecision {
                StoppingDecision::ForceStop(n)
            }
        }
        let composite = CompositeStoppingCriterion::new(vec![
            Box::new(MaxRulesStoppingCriterion { max_rules: 1 }),
            Box::new(AlwaysForceStop),
        ]);
        let partition = Partition::training_only(2);
        let s = stats();
        assert_eq!(
            composite.test(&partition, &s, 5),
            StoppingDecision::ForceStop(5)
        );
    }
}
