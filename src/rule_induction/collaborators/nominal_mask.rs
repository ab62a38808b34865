//! The nominal-feature mask collaborator (§6): `isNominal(j) -> bool`.

use std::collections::HashSet;

/// Forces equality/inequality conditions for nominal features; numerical
/// features use `<=`/`>`.
pub trait NominalMask: Send + Sync {
    fn is_nominal(&self, feature_index: usize) -> bool;
}

/// Every feature is numerical.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllNumerical;

impl NominalMask for AllNumerical {
    fn is_nominal(&self, _feature_index: usize) -> bool {
        false
    }
}

/// A fixed set of nominal feature indices; every other feature is
/// numerical.
#[derive(Debug, Clone, Default)]
pub struct IndexSetNominalMask(HashSet<usize>);

impl IndexSetNominalMask {
    pub fn new(nominal_indices: impl IntoIterator<Item = usize>) -> Self {
        Self(nominal_indices.into_iter().collect())
    }
}

impl NominalMask for IndexSetNominalMask {
    fn is_nominal(&self, feature_index: usize) -> bool {
        self.0.contains(&feature_index)
    }
}
