//! Model representation: conditions, rules, and the committed rule list (C11).
//!
//! Transient refinements are discarded once a rule is committed or a sweep
//! finds nothing better; only the types in this module are kept for the
//! lifetime of the model.

use serde::{Deserialize, Serialize};

/// The comparator a [`Condition`] tests its feature value against.
///
/// Numerical features use `Leq`/`Gr`; nominal features use `Eq`/`Neq`
/// (`Neq` only when [`crate::config::RuleInductionConfig::use_neq`] is set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// `feature <= threshold` (numerical).
    Leq,
    /// `feature > threshold` (numerical).
    Gr,
    /// `feature == threshold` (nominal).
    Eq,
    /// `feature != threshold` (nominal, gated by `use_neq`).
    Neq,
}

impl Comparator {
    /// Evaluate this comparator against a raw feature value. `None` stands
    /// for "missing"; a missing feature never satisfies any condition.
    pub fn matches(self, value: Option<f32>, threshold: f32) -> bool {
        match value {
            None => false,
            Some(v) => match self {
                Comparator::Leq => v <= threshold,
                Comparator::Gr => v > threshold,
                Comparator::Eq => v == threshold,
                Comparator::Neq => v != threshold,
            },
        }
    }
}

/// A single-feature boolean test, plus the span bookkeeping the exact
/// refinement search needs to drive [`crate::rule_induction::thresholds`]'s
/// `filterCurrentVector`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub feature_index: usize,
    pub comparator: Comparator,
    pub threshold: f32,
    /// Number of examples this condition covers (before being combined with
    /// earlier conditions in the same rule body).
    pub num_covered: u32,
    /// `true` when this condition selects the `[start, end)` region of the
    /// sorted feature vector directly; `false` when it selects the
    /// complement of that region.
    pub covered: bool,
    /// Start of the selected span in the (filtered) sorted feature vector.
    pub start: usize,
    /// End (exclusive) of the selected span.
    pub end: usize,
    /// The span's end before zero-weight [`crate::rule_induction::thresholds::ThresholdsSubset::adjust_split`]
    /// adjustment; `filterCurrentVector` needs both.
    pub previous: usize,
}

impl Condition {
    /// Evaluate this condition against one example's raw feature value.
    pub fn matches(&self, value: Option<f32>) -> bool {
        self.comparator.matches(value, self.threshold)
    }
}

/// A rule body (conjunction of conditions) plus its head.
///
/// The head here is a single scalar "+1 covered" prediction: the system is
/// univariate, so there is nothing richer to store than "this rule fires".
/// The default rule has an empty body and predicts nothing (§9: "a no-op
/// predictor in this instantiation").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rule {
    pub conditions: Vec<Condition>,
    /// Quality score the rule's coverage achieved when committed
    /// (`-|pearson|`, lower is better). `None` for the default rule.
    pub quality: Option<f64>,
}

impl Rule {
    pub fn default_rule() -> Self {
        Self {
            conditions: Vec::new(),
            quality: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Re-evaluate this rule's body against one example's raw feature row
    /// (indexed by feature index, `None` meaning missing, absent entries
    /// treated as the sparse zero). Used by property tests that check a
    /// committed rule reproduces its reported `num_covered`.
    pub fn covers(&self, feature_value: impl Fn(usize) -> Option<f32>) -> bool {
        if self.is_default() {
            return false;
        }
        self.conditions
            .iter()
            .all(|c| c.matches(feature_value(c.feature_index)))
    }
}

/// An ordered list of committed rules; the default rule, if present, is
/// first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleList {
    pub rules: Vec<Rule>,
}

impl RuleList {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The global prediction for one example: number of rules whose body
    /// matches (the default rule never contributes).
    pub fn predict(&self, feature_value: impl Fn(usize) -> Option<f32> + Copy) -> bool {
        self.rules.iter().any(|r| r.covers(feature_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(feature_index: usize, comparator: Comparator, threshold: f32) -> Condition {
        Condition {
            feature_index,
            comparator,
            threshold,
            num_covered: 0,
            covered: true,
            start: 0,
            end: 0,
            previous: 0,
        }
    }

    #[test]
    fn leq_and_gr_are_complementary() {
        assert!(Comparator::Leq.matches(Some(0.5), 0.5));
        assert!(!Comparator::Gr.matches(Some(0.5), 0.5));
        assert!(Comparator::Gr.matches(Some(0.6), 0.5));
    }

    #[test]
    fn missing_never_matches() {
        assert!(!Comparator::Leq.matches(None, 0.5));
        assert!(!Comparator::Neq.matches(None, 0.5));
    }

    #[test]
    fn rule_body_is_conjunctive() {
        let rule = Rule {
            conditions: vec![
                cond(0, Comparator::Gr, 0.0),
                cond(1, Comparator::Leq, 10.0),
            ],
            quality: Some(-1.0),
        };
        let row = |j: usize| match j {
            0 => Some(1.0),
            1 => Some(5.0),
            _ => None,
        };
        assert!(rule.covers(row));

        let row_fails_second = |j: usize| match j {
            0 => Some(1.0),
            1 => Some(50.0),
            _ => None,
        };
        assert!(!rule.covers(row_fails_second));
    }

    #[test]
    fn default_rule_covers_nothing() {
        let rule = Rule::default_rule();
        assert!(!rule.covers(|_| Some(1.0)));
    }

    #[test]
    fn rule_list_round_trips_through_json_on_disk() {
        use std::io::{Read as _, Seek as _, SeekFrom, Write as _};

        let model = RuleList {
            rules: vec![
                Rule {
                    conditions: vec![
                        cond(0, Comparator::Gr, 0.5),
                        cond(2, Comparator::Eq, 1.0),
                    ],
                    quality: Some(-1.0),
                },
                Rule::default_rule(),
            ],
        };

        let mut file = tempfile::tempfile().expect("create temp file for round-trip test");
        serde_json::to_writer(&file, &model).expect("serialize rule list");
        file.flush().expect("flush serialized rule list");
        file.seek(SeekFrom::Start(0)).expect("rewind temp file");

        let mut contents = String::new();
        file.read_to_string(&mut contents).expect("read back serialized rule list");
        let restored: RuleList = serde_json::from_str(&contents).expect("deserialize rule list");

        assert_eq!(restored.len(), model.len());
        assert_eq!(restored.rules[0].conditions, model.rules[0].conditions);
        assert_eq!(restored.rules[0].quality, model.rules[0].quality);
        assert!(restored.rules[1].is_default());
    }
}
