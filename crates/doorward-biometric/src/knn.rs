//! k-nearest-neighbour face model.
//!
//! Distances are Euclidean over the flattened pixel vectors, the `k`
//! closest enrolled vectors vote with equal weight, and a tied vote goes to
//! the lexicographically smallest label. A model with fewer than `k`
//! enrolled vectors can be fitted but refuses to predict.

use std::collections::BTreeMap;

use doorward_core::{EnrollmentData, FaceSample, Identity};

use crate::{BiometricError, Result};

/// Fitted k-NN model over enrolled face vectors.
///
/// # Examples
///
/// ```
/// use doorward_biometric::KnnClassifier;
/// use doorward_core::{FaceSample, Identity};
///
/// let alice = Identity::new("alice").unwrap();
/// let bob = Identity::new("bob").unwrap();
/// let model = KnnClassifier::fit(
///     vec![vec![0.0, 0.0], vec![10.0, 10.0]],
///     vec![alice.clone(), bob],
///     1,
/// ).unwrap();
///
/// let sample = FaceSample::new(vec![1.0, 1.0]).unwrap();
/// assert_eq!(model.predict(&sample).unwrap(), alice);
/// ```
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    vectors: Vec<Vec<f32>>,
    labels: Vec<Identity>,
    k: usize,
    dimension: usize,
}

impl KnnClassifier {
    /// Fit the model to parallel vector and label lists.
    ///
    /// # Errors
    /// - `BiometricError::InvalidNeighbors` if `k` is zero
    /// - `BiometricError::LabelMismatch` if the lists differ in length
    /// - `BiometricError::EmptyModel` if there are no vectors
    /// - `BiometricError::DimensionMismatch` if vectors differ in length
    pub fn fit(vectors: Vec<Vec<f32>>, labels: Vec<Identity>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(BiometricError::InvalidNeighbors(k));
        }
        if vectors.len() != labels.len() {
            return Err(BiometricError::LabelMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }

        let dimension = vectors.first().ok_or(BiometricError::EmptyModel)?.len();
        if let Some(ragged) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(BiometricError::DimensionMismatch {
                expected: dimension,
                actual: ragged.len(),
            });
        }

        Ok(Self {
            vectors,
            labels,
            k,
            dimension,
        })
    }

    /// Fit the model to loaded enrollment data.
    pub fn from_enrollment(data: &EnrollmentData, k: usize) -> Result<Self> {
        Self::fit(data.faces().to_vec(), data.labels().to_vec(), k)
    }

    /// Label for the majority of the `k` nearest enrolled vectors.
    ///
    /// # Errors
    /// - `BiometricError::DimensionMismatch` if the sample length differs
    ///   from the enrolled vectors
    /// - `BiometricError::TooFewVectors` if fewer than `k` vectors are
    ///   enrolled
    pub fn predict(&self, sample: &FaceSample) -> Result<Identity> {
        let values = sample.values();
        if values.len() != self.dimension {
            return Err(BiometricError::DimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }
        if self.vectors.len() < self.k {
            return Err(BiometricError::TooFewVectors {
                k: self.k,
                enrolled: self.vectors.len(),
            });
        }

        let mut distances: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| (squared_distance(vector, values), index))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<&Identity, usize> = BTreeMap::new();
        for &(_, index) in distances.iter().take(self.k) {
            *votes.entry(&self.labels[index]).or_default() += 1;
        }

        // BTreeMap iterates in label order, so the first maximum wins ties.
        let mut winner: Option<(&Identity, usize)> = None;
        for (label, count) in votes {
            if winner.is_none_or(|(_, top)| count > top) {
                winner = Some((label, count));
            }
        }

        winner
            .map(|(label, _)| label.clone())
            .ok_or(BiometricError::EmptyModel)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Length of each enrolled vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of enrolled vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
