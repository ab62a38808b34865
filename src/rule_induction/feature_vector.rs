//! Feature vectors: sorted (value, example-index) pairs plus a missing set (C2).

use std::collections::BTreeSet;

/// One (value, example-index) pair belonging to a feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEntry {
    pub value: f32,
    pub example_index: u32,
}

/// The raw, unsorted result of fetching one feature's column from the
/// feature matrix: every (value, example-index) pair whose value is present
/// and non-zero, plus the set of examples missing that feature entirely.
/// Examples absent from both are implicit sparse zeros.
#[derive(Debug, Clone, Default)]
pub struct RawFeatureVector {
    pub pairs: Vec<(f32, u32)>,
    pub missing: Vec<u32>,
}

/// A feature's column, sorted ascending by value and cached for the
/// lifetime of training. Equal values form maximal runs and are never split.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    entries: Vec<FeatureEntry>,
    missing: BTreeSet<u32>,
}

impl FeatureVector {
    /// Sort the raw (value, example-index) pairs once and cache them.
    pub fn from_raw(raw: RawFeatureVector) -> Self {
        let mut entries: Vec<FeatureEntry> = raw
            .pairs
            .into_iter()
            .map(|(value, example_index)| FeatureEntry {
                value,
                example_index,
            })
            .collect();
        entries.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            entries,
            missing: raw.missing.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn missing(&self) -> &BTreeSet<u32> {
        &self.missing
    }

    pub fn is_missing(&self, example_index: u32) -> bool {
        self.missing.contains(&example_index)
    }

    /// Total number of examples this vector has an opinion about (present,
    /// non-zero entries plus missing ones); the rest are sparse zeros.
    pub fn num_explicit(&self) -> usize {
        self.entries.len() + self.missing.len()
    }

    /// Build a filtered view retaining only examples for which `keep` is
    /// true (used by the thresholds subsystem to restrict a base vector to
    /// the examples still covered by a partial rule).
    pub fn filter(&self, keep: impl Fn(u32) -> bool) -> FeatureVector {
        let entries = self
            .entries
            .iter()
            .copied()
            .filter(|e| keep(e.example_index))
            .collect();
        let missing = self
            .missing
            .iter()
            .copied()
            .filter(|&i| keep(i))
            .collect();
        FeatureVector { entries, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_sorts_ascending() {
        let raw = RawFeatureVector {
            pairs: vec![(3.0, 2), (1.0, 0), (2.0, 1)],
            missing: vec![5],
        };
        let fv = FeatureVector::from_raw(raw);
        let values: Vec<f32> = fv.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(fv.is_missing(5));
        assert!(!fv.is_missing(0));
    }

    #[test]
    fn equal_values_stay_contiguous() {
        let raw = RawFeatureVector {
            pairs: vec![(1.0, 0), (1.0, 1), (0.5, 2)],
            missing: vec![],
        };
        let fv = FeatureVector::from_raw(raw);
        let values: Vec<f32> = fv.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn filter_restricts_to_kept_examples() {
        let raw = RawFeatureVector {
            pairs: vec![(1.0, 0), (2.0, 1), (3.0, 2)],
            missing: vec![3],
        };
        let fv = FeatureVector::from_raw(raw);
        let filtered = fv.filter(|i| i != 1 && i != 3);
        let indices: Vec<u32> = filtered.entries().iter().map(|e| e.example_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(filtered.missing().is_empty());
    }
}
