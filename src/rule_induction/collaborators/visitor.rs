//! Prediction visitor collaborator (§6): invoked once per committed rule
//! with the current prediction vector, and once at the end with the
//! ground-truth vector.

pub trait PredictionVisitor: Send {
    fn visit_prediction(&mut self, rule_index: usize, prediction: &[u32]);
    fn visit_ground_truth(&mut self, ground_truth: &[u32]);
}

/// Discards everything; the default for callers that only want the final
/// `RuleList`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPredictionVisitor;

impl PredictionVisitor for NoOpPredictionVisitor {
    fn visit_prediction(&mut self, _rule_index: usize, _prediction: &[u32]) {}
    fn visit_ground_truth(&mut self, _ground_truth: &[u32]) {}
}

/// Records every emitted prediction vector and the final ground truth, for
/// assertions in the scenario tests (S1-S3).
#[derive(Debug, Clone, Default)]
pub struct RecordingPredictionVisitor {
    pub predictions: Vec<Vec<u32>>,
    pub ground_truth: Vec<u32>,
}

impl PredictionVisitor for RecordingPredictionVisitor {
    fn visit_prediction(&mut self, _rule_index: usize, prediction: &[u32]) {
        self.predictions.push(prediction.to_vec());
    }

    fn visit_ground_truth(&mut self, ground_truth: &[u32]) {
        self.ground_truth = ground_truth.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_visitor_keeps_every_prediction_in_order() {
        let mut visitor = RecordingPredictionVisitor::default();
        visitor.visit_prediction(0, &[1, 0]);
        visitor.visit_prediction(1, &[1, 1]);
        visitor.visit_ground_truth(&[1, 1]);
        assert_eq!(visitor.predictions, vec![vec![1, 0], vec![1, 1]]);
        assert_eq!(visitor.ground_truth, vec![1, 1]);
    }
}
