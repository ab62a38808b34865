//! Label-wise rule evaluation: the scalar quality of a candidate prediction
//! vector (C5).
//!
//! Quality is the negated absolute Pearson correlation between a candidate
//! per-time-slot prediction vector and the ground-truth count vector, so
//! that lower is always better and a perfect (anti-)correlation scores
//! `-1.0`. Mirrors the `n*sum_xy - sum_x*sum_y` formulation this corpus
//! already uses for Pearson correlation (see
//! `ml_engine::correlations::CorrelationEngine::pearson`), generalized to
//! integer count vectors and wrapped so zero variance yields "no score"
//! instead of a silent `0.0`.

/// Pearson correlation coefficient between two equal-length sequences, or
/// `None` if either sequence has zero variance (denominator is zero).
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;
    if n == 0.0 {
        return None;
    }

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;
    let denominator = (var_x * var_y).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        let r = numerator / denominator;
        if r.is_finite() {
            Some(r)
        } else {
            None
        }
    }
}

/// The overall quality score of a candidate prediction vector: `-|r|`
/// against the ground truth, or `None` when the correlation is undefined
/// (§4.2: "the head is rejected").
pub fn overall_quality_score(prediction: &[i64], ground_truth: &[u32]) -> Option<f64> {
    debug_assert_eq!(prediction.len(), ground_truth.len());
    let x: Vec<f64> = prediction.iter().map(|&v| v as f64).collect();
    let y: Vec<f64> = ground_truth.iter().map(|&v| v as f64).collect();
    pearson(&x, &y).map(|r| -r.abs())
}
