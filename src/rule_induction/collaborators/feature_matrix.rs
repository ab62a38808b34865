//! The feature-matrix loader collaborator (§6): `fetchFeatureVector(j, out)`.

use crate::rule_induction::feature_vector::RawFeatureVector;

/// Per-feature column access. `fetch_feature_vector` returns every
/// (value, example-index) pair whose value is present and non-zero, plus
/// the set of examples missing that feature; examples in neither are
/// implicit sparse zeros (§3).
pub trait FeatureMatrix: Send + Sync {
    fn num_features(&self) -> usize;
    fn num_examples(&self) -> usize;
    fn fetch_feature_vector(&self, feature_index: usize) -> RawFeatureVector;
}

/// A dense, row-major `Vec<Vec<f32>>`-backed feature matrix.
///
/// `f32::NAN` marks a missing value (§3's "Missing index"); an exact `0.0`
/// is the sparse zero and is omitted from the fetched pairs entirely,
/// matching the feature vector's definition exactly.
#[derive(Debug, Clone)]
pub struct InMemoryFeatureMatrix {
    rows: Vec<Vec<f32>>,
    num_features: usize,
}

impl InMemoryFeatureMatrix {
    /// `rows[i][j]` is example `i`'s value for feature `j`. All rows must
    /// have the same length; an empty matrix has zero features.
    pub fn new(rows: Vec<Vec<f32>>) -> Self {
        let num_features = rows.first().map_or(0, Vec::len);
        debug_assert!(
            rows.iter().all(|r| r.len() == num_features),
            "all rows must have the same number of features"
        );
        Self { rows, num_features }
    }
}

impl FeatureMatrix for InMemoryFeatureMatrix {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_examples(&self) -> usize {
        self.rows.len()
    }

    fn fetch_feature_vector(&self, feature_index: usize) -> RawFeatureVector {
        let mut pairs = Vec::new();
        let mut missing = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let value = row[feature_index];
            if value.is_nan() {
                missing.push(i as u32);
            } else if value != 0.0 {
                pairs.push((value, i as u32));
            }
        }
        RawFeatureVector { pairs, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_zero_is_omitted_and_nan_is_missing() {
        let matrix = InMemoryFeatureMatrix::new(vec![
            vec![0.0, 1.0],
            vec![f32::NAN, 2.0],
            vec![3.0, 0.0],
        ]);
        let fv0 = matrix.fetch_feature_vector(0);
        assert_eq!(fv0.pairs, vec![(3.0, 2)]);
        assert_eq!(fv0.missing, vec![1]);

        let fv1 = matrix.fetch_feature_vector(1);
        assert_eq!(fv1.pairs, vec![(1.0, 0), (2.0, 1)]);
        assert!(fv1.missing.is_empty());
    }

    #[test]
    fn dimensions_are_reported() {
        let matrix = InMemoryFeatureMatrix::new(vec![vec![1.0, 2.0, 3.0]; 4]);
        assert_eq!(matrix.num_examples(), 4);
        assert_eq!(matrix.num_features(), 3);
    }
}
