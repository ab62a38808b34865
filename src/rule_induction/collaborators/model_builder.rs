//! Model builder collaborator (§6): `addRule(conditions, head)`,
//! `build(numUsedRules) -> ruleList`.

use crate::rule_induction::model::{Condition, Rule, RuleList};

/// Accumulates committed rules and, at the end of training, truncates (or
/// not) to the persisted model.
pub trait ModelBuilder: Send {
    /// Append one committed rule. `quality` is `None` for the default rule.
    fn add_rule(&mut self, conditions: Vec<Condition>, quality: Option<f64>);

    /// Assemble the final rule list. `num_used_rules == 0` means "emit all
    /// rules"; otherwise truncate to the first `num_used_rules` (S5).
    fn build(&mut self, num_used_rules: usize) -> RuleList;
}

/// The crate's own [`ModelBuilder`]: accumulates rules into a `Vec` and
/// truncates on `build`.
#[derive(Debug, Clone, Default)]
pub struct VecModelBuilder {
    rules: Vec<Rule>,
}

impl VecModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelBuilder for VecModelBuilder {
    fn add_rule(&mut self, conditions: Vec<Condition>, quality: Option<f64>) {
        self.rules.push(Rule {
            conditions,
            quality,
        });
    }

    fn build(&mut self, num_used_rules: usize) -> RuleList {
        let mut rules = std::mem::take(&mut self.rules);
        if num_used_rules != 0 && num_used_rules < rules.len() {
            rules.truncate(num_used_rules);
        }
        RuleList { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_induction::model::Comparator;

    fn dummy_condition(feature_index: usize) -> Condition {
        Condition {
            feature_index,
            comparator: Comparator::Gr,
            threshold: 0.0,
            num_covered: 1,
            covered: true,
            start: 0,
            end: 1,
            previous: 0,
        }
    }

    #[test]
    fn build_with_zero_emits_all_rules() {
        let mut builder = VecModelBuilder::new();
        for i in 0..8 {
            builder.add_rule(vec![dummy_condition(i)], Some(-0.5));
        }
        let model = builder.build(0);
        assert_eq!(model.len(), 8);
    }

    #[test]
    fn build_truncates_to_num_used_rules() {
        let mut builder = VecModelBuilder::new();
        for i in 0..8 {
            builder.add_rule(vec![dummy_condition(i)], Some(-0.5));
        }
        let model = builder.build(3);
        assert_eq!(model.len(), 3);
    }
}
