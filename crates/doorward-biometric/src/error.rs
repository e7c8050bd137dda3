//! Error types for face classification.

use doorward_hardware::HardwareError;

/// Result type alias for classification operations.
pub type Result<T> = std::result::Result<T, BiometricError>;

/// Errors raised while building or querying the face model.
#[derive(Debug, thiserror::Error)]
pub enum BiometricError {
    /// Sample length differs from the enrolled vectors.
    #[error("Face sample has {actual} values, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector and label lists differ in length.
    #[error("{vectors} face vectors but {labels} labels")]
    LabelMismatch { vectors: usize, labels: usize },

    /// Model has no enrolled vectors.
    #[error("Face model is empty")]
    EmptyModel,

    /// Fewer enrolled vectors than voting neighbours.
    #[error("Cannot take {k} neighbours from {enrolled} enrolled vectors")]
    TooFewVectors { k: usize, enrolled: usize },

    /// Neighbour count must be at least one.
    #[error("Invalid neighbour count: {0}")]
    InvalidNeighbors(usize),

    /// Face crop could not be extracted from the frame.
    #[error("Face crop failed: {0}")]
    Crop(#[from] HardwareError),

    /// Invalid sample or enrollment data.
    #[error(transparent)]
    Core(#[from] doorward_core::Error),
}
