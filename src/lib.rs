//! syndrome-rules: top-down greedy rule induction over time-indexed count
//! data.
//!
//! Produces a human-readable `IF <conditions> THEN predict covered` rule
//! list, one feature-value conjunction at a time, scored by negated
//! absolute Pearson correlation between a rule's coverage and the ground
//! truth counts per time slot (lower is better).
//!
//! ## Architecture
//!
//! - **Statistics**: per-time-slot coverage bookkeeping (`rule_induction::statistics`)
//! - **Refinement search**: exact per-feature threshold/value search (`rule_induction::refinement_search`)
//! - **Thresholds subsystem**: per-rule feature-vector caching and condition commit (`rule_induction::thresholds`)
//! - **Top-down induction**: parallel per-feature search, deterministic reduction (`rule_induction::top_down_induction`)
//! - **Driver**: the sequential per-rule loop and stopping-criterion integration (`rule_induction::driver`)

pub mod config;
pub mod error;
pub mod rule_induction;

pub use config::RuleInductionConfig;
pub use error::{Result, RuleInductionError};
pub use rule_induction::{induce, DriverCollaborators, RuleList};

/// Install a default `tracing` subscriber (env-filtered, `info` unless
/// `RUST_LOG` says otherwise) for embedding applications that just want the
/// crate's `debug!`/`info!`/`warn!` emission points (§5/§10.1) on stderr
/// without writing their own subscriber setup. Optional: the core never
/// calls this itself, since CLI/logging wiring is out of this crate's scope
/// (spec §1) -- only an embedding binary should decide how logs are routed.
/// Mirrors the teacher binary's own `tracing_subscriber::fmt()` setup.
pub fn init_tracing_subscriber() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .try_init()
        .ok();
}
