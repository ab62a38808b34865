//! Crate-wide error type.
//!
//! Mirrors the classification in the induction design: contract violations
//! fail fast at construction, search exhaustion and undefined quality are
//! ordinary `Option::None` values (not errors), and collaborator I/O failures
//! are propagated unchanged.

use thiserror::Error;

/// Errors surfaced by the rule-induction core and its default collaborators.
#[derive(Debug, Error)]
pub enum RuleInductionError {
    /// A configuration value violates a hard contract (e.g. `min_support >= 1`).
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The label matrix has zero examples or zero time slots.
    #[error("label matrix is empty (N or T is zero)")]
    EmptyLabelMatrix,

    /// A collaborator asked for a feature index outside `[0, num_features)`.
    #[error("feature index {index} out of bounds (num_features = {num_features})")]
    FeatureIndexOutOfBounds { index: usize, num_features: usize },

    /// An external collaborator (feature/label matrix loader, etc.) failed.
    /// Propagated unchanged; the core never retries.
    #[error("collaborator failed: {source}")]
    CollaboratorError {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience alias used throughout the crate's fallible entry points.
pub type Result<T> = std::result::Result<T, RuleInductionError>;
