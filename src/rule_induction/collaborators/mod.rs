//! Default, in-memory implementations of the external collaborators §6
//! treats purely as interfaces: the label matrix, feature matrix, nominal
//! mask, RNG, sub-samplers, stopping criteria, model builder, and
//! prediction visitor. The induction core (see the sibling modules)
//! consumes only the traits; these are additive so a caller can run the
//! driver end to end without writing a collaborator first.

pub mod feature_matrix;
pub mod label_matrix;
pub mod model_builder;
pub mod nominal_mask;
pub mod rng;
pub mod stopping;
pub mod sub_sampling;
pub mod visitor;

pub use feature_matrix::{FeatureMatrix, InMemoryFeatureMatrix};
pub use label_matrix::{InMemoryLabelMatrix, LabelMatrix};
pub use model_builder::{ModelBuilder, VecModelBuilder};
pub use nominal_mask::{AllNumerical, IndexSetNominalMask, NominalMask};
pub use rng::DefaultRng;
pub use stopping::{
    CompositeStoppingCriterion, MaxRulesStoppingCriterion, NoStoppingCriterion, Partition,
    StoppingCriterion, StoppingDecision,
};
pub use sub_sampling::{
    BaggingInstanceSubSampling, FeatureSubSampling, InstanceSubSampling, NoFeatureSubSampling,
    NoInstanceSubSampling, UniformFeatureSubSampling,
};
pub use visitor::{NoOpPredictionVisitor, PredictionVisitor, RecordingPredictionVisitor};
