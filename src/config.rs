//! Rule-induction configuration.
//!
//! `max_rules` and `time_limit` are deliberately absent: they belong to the
//! stopping-criteria collaborator, not to the core's options (see
//! [`crate::rule_induction::driver`]).

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleInductionError};

/// Tunable options for the top-down rule-refinement core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleInductionConfig {
    /// Minimum fraction of examples a condition must cover, in `[0, 1)`.
    /// `min_coverage = floor(min_support * num_examples)`.
    #[serde(default = "defaults::min_support")]
    pub min_support: f64,

    /// Upper bound on conditions per rule body. `-1` disables the bound.
    #[serde(default = "defaults::max_conditions")]
    pub max_conditions: i32,

    /// Number of parallel workers used by the per-feature refinement search.
    #[serde(default = "defaults::num_threads")]
    pub num_threads: usize,

    /// Emit `<=` conditions on numerical features.
    #[serde(default = "defaults::use_leq")]
    pub use_leq: bool,

    /// Emit `!=` conditions on nominal features.
    #[serde(default = "defaults::use_neq")]
    pub use_neq: bool,
}

mod defaults {
    pub fn min_support() -> f64 {
        0.0
    }
    pub fn max_conditions() -> i32 {
        -1
    }
    pub fn num_threads() -> usize {
        1
    }
    pub fn use_leq() -> bool {
        true
    }
    pub fn use_neq() -> bool {
        false
    }
}

impl Default for RuleInductionConfig {
    fn default() -> Self {
        Self {
            min_support: defaults::min_support(),
            max_conditions: defaults::max_conditions(),
            num_threads: defaults::num_threads(),
            use_leq: defaults::use_leq(),
            use_neq: defaults::use_neq(),
        }
    }
}

impl RuleInductionConfig {
    /// Validate the contract violations classified in the error-handling design:
    /// `min_support >= 1`, `max_conditions == 0`, `num_threads == 0`.
    ///
    /// Fails fast on the first violation found; callers should validate once at
    /// construction, not on every call into the core.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.min_support) {
            return Err(RuleInductionError::InvalidConfig {
                reason: format!(
                    "min_support must be in [0, 1), got {}",
                    self.min_support
                ),
            });
        }
        if self.max_conditions == 0 {
            return Err(RuleInductionError::InvalidConfig {
                reason: "max_conditions must be >= 1 or -1, got 0".to_string(),
            });
        }
        if self.max_conditions < -1 {
            return Err(RuleInductionError::InvalidConfig {
                reason: format!(
                    "max_conditions must be >= 1 or -1, got {}",
                    self.max_conditions
                ),
            });
        }
        if self.num_threads == 0 {
            return Err(RuleInductionError::InvalidConfig {
                reason: "num_threads must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// `min_coverage = floor(min_support * num_examples)`.
    pub fn min_coverage(&self, num_examples: usize) -> usize {
        (self.min_support * num_examples as f64).floor() as usize
    }
}
