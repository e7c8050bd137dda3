//! Face classification for the Doorward door controller.
//!
//! The pipeline is: a face crop from the detector is normalized into a
//! fixed-size [`FaceSample`](doorward_core::FaceSample) by
//! [`FaceNormalizer`], then labelled by the k-nearest-neighbour model in
//! [`KnnClassifier`]. [`KnnFaceClassifier`] combines both behind the
//! [`FaceClassifier`] trait and never fails: any prediction error becomes
//! [`Classification::Unknown`].

pub mod classifier;
pub mod error;
pub mod knn;
pub mod sample;

pub use classifier::{Classification, FaceClassifier, KnnFaceClassifier};
pub use error::{BiometricError, Result};
pub use knn::KnnClassifier;
pub use sample::FaceNormalizer;
