//! The rule-induction core (§2-§5): sparse feature storage, label-wise
//! statistics, the exact per-feature refinement search, the thresholds
//! subsystem that commits conditions, top-down rule growth, and the
//! sequential driver that ties them together. `collaborators` holds the
//! external-interface traits (§6) plus this crate's own in-memory
//! implementations of them (§10.5).

pub mod collaborators;
pub mod container;
pub mod coverage_mask;
pub mod driver;
pub mod evaluation;
pub mod feature_vector;
pub mod head;
pub mod model;
pub mod refinement_search;
pub mod statistics;
pub mod thresholds;
pub mod top_down_induction;

pub use driver::{induce, DriverCollaborators};
pub use model::{Comparator, Condition, Rule, RuleList};
pub use top_down_induction::{induce_rule, InductionOptions, InductionOutcome};
