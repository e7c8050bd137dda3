use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Enrollment errors
    #[error("Failed to load enrollment file {path}: {message}")]
    EnrollmentLoad { path: String, message: String },

    #[error(
        "Enrollment data is inconsistent: {labels} labels, {faces} face vectors, {tokens} tokens"
    )]
    EnrollmentMismatch {
        labels: usize,
        faces: usize,
        tokens: usize,
    },

    #[error("Registry needs one token per label: {labels} labels, {tokens} tokens")]
    RegistryMismatch { labels: usize, tokens: usize },

    #[error("Face vector {index} has {actual} values, expected {expected}")]
    RaggedFaceVector {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Enrollment data is empty")]
    EmptyEnrollment,

    // Identity and token errors
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    // Sample errors
    #[error("Invalid face sample: {0}")]
    InvalidFaceSample(String),

    // Session errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
