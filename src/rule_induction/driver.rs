//! Sequential model induction driver (C10): repeatedly calls C9 to grow one
//! rule at a time, consults the stopping criterion between rules, and
//! assembles the final rule list (§4.7).

use crate::config::RuleInductionConfig;
use crate::error::{Result, RuleInductionError};
use crate::rule_induction::collaborators::feature_matrix::FeatureMatrix;
use crate::rule_induction::collaborators::label_matrix::LabelMatrix;
use crate::rule_induction::collaborators::model_builder::ModelBuilder;
use crate::rule_induction::collaborators::nominal_mask::NominalMask;
use crate::rule_induction::collaborators::stopping::{Partition, StoppingCriterion, StoppingDecision};
use crate::rule_induction::collaborators::sub_sampling::{FeatureSubSampling, InstanceSubSampling};
use crate::rule_induction::collaborators::visitor::PredictionVisitor;
use crate::rule_induction::container::Rng;
use crate::rule_induction::model::RuleList;
use crate::rule_induction::statistics::LabelWiseStatistics;
use crate::rule_induction::thresholds::ThresholdsSubsystem;
use crate::rule_induction::top_down_induction::{induce_rule, InductionOptions};

/// Every external collaborator C10 needs, bundled so callers pass one
/// struct instead of eight positional arguments. Each field mirrors one
/// row of §6's external-interfaces table.
pub struct DriverCollaborators<'a> {
    pub label_matrix: &'a dyn LabelMatrix,
    pub feature_matrix: &'a dyn FeatureMatrix,
    pub nominal_mask: &'a dyn NominalMask,
    pub rng: &'a mut dyn Rng,
    pub feature_sub_sampling: &'a dyn FeatureSubSampling,
    pub instance_sub_sampling: &'a dyn InstanceSubSampling,
    pub stopping_criterion: &'a dyn StoppingCriterion,
    pub model_builder: &'a mut dyn ModelBuilder,
    pub visitor: &'a mut dyn PredictionVisitor,
}

/// Run top-down rule induction end to end (§4.7) and return the committed
/// [`RuleList`]. `config` is validated before anything else is touched.
pub fn induce(config: &RuleInductionConfig, collaborators: DriverCollaborators<'_>) -> Result<RuleList> {
    config.validate()?;

    let DriverCollaborators {
        label_matrix,
        feature_matrix,
        nominal_mask,
        rng,
        feature_sub_sampling,
        instance_sub_sampling,
        stopping_criterion,
        model_builder,
        visitor,
    } = collaborators;

    let mut statistics = LabelWiseStatistics::new(label_matrix)?;
    let num_examples = statistics.num_examples();

    // Step 2: the default rule is a no-op predictor in this instantiation
    // (§9 "Design notes"); this crate ships no default-head factory, so the
    // default rule is always skipped and rule counting starts from zero.

    let mut thresholds = ThresholdsSubsystem::new(num_examples);
    let partition = Partition::training_only(num_examples);

    let options = InductionOptions {
        max_conditions: config.max_conditions,
        use_leq: config.use_leq,
        use_neq: config.use_neq,
        min_coverage: config.min_coverage(num_examples),
    };

    // §6's `numThreads` configures C9's parallel fan-out; build a scoped
    // pool once and reuse it across every rule rather than spinning one up
    // per call to `induce_rule`.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
        .map_err(|source| RuleInductionError::CollaboratorError {
            source: Box::new(source),
        })?;

    let mut num_rules = 0_usize;
    let mut num_used_rules = 0_usize;
    let mut current_quality: Option<f64> = None;

    loop {
        let decision = stopping_criterion.test(&partition, &statistics, num_rules);
        match decision {
            StoppingDecision::ForceStop(k) => {
                tracing::warn!(num_rules = k, "stopping criterion forced stop");
                break;
            }
            StoppingDecision::StoreStop(k) => {
                tracing::warn!(num_rules = k, "stopping criterion requested stop");
                if num_used_rules == 0 {
                    num_used_rules = k;
                }
            }
            StoppingDecision::Continue => {}
        }

        let weights = instance_sub_sampling.sample(num_examples, rng);
        let outcome = pool.install(|| {
            induce_rule(
                &mut thresholds,
                &mut statistics,
                &weights,
                feature_matrix,
                nominal_mask,
                feature_sub_sampling,
                rng,
                model_builder,
                options,
                current_quality,
            )
        });

        if !outcome.committed {
            break;
        }
        current_quality = outcome.quality;
        num_rules += 1;
        visitor.visit_prediction(num_rules - 1, statistics.prediction());
    }

    visitor.visit_ground_truth(statistics.ground_truth());

    tracing::info!(
        num_rules,
        num_used_rules,
        "rule induction finished"
    );

    Ok(model_builder.build(num_used_rules))
}
