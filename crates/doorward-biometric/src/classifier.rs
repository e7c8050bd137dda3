//! Classifier adapter used by the access controller.

use std::fmt;

use doorward_core::Identity;
use doorward_hardware::{BoundingBox, Frame};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{FaceNormalizer, KnnClassifier, Result};

/// Result of classifying one detected face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Identity(Identity),
    /// No prediction could be made.
    Unknown,
}

impl Classification {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Classification::Identity(identity) => Some(identity),
            Classification::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Classification::Unknown)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Identity(identity) => write!(f, "{identity}"),
            Classification::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Labels a face detected in a frame.
///
/// Implementations must not fail; anything that prevents a prediction is
/// reported as [`Classification::Unknown`].
pub trait FaceClassifier: Send + Sync {
    fn classify(&self, frame: &Frame, face: &BoundingBox) -> Classification;
}

/// [`FaceClassifier`] backed by a [`KnnClassifier`].
#[derive(Debug, Clone)]
pub struct KnnFaceClassifier {
    normalizer: FaceNormalizer,
    model: KnnClassifier,
}

impl KnnFaceClassifier {
    pub fn new(normalizer: FaceNormalizer, model: KnnClassifier) -> Self {
        Self { normalizer, model }
    }

    pub fn model(&self) -> &KnnClassifier {
        &self.model
    }

    fn predict(&self, frame: &Frame, face: &BoundingBox) -> Result<Identity> {
        let crop = frame.crop(face)?;
        let sample = self.normalizer.normalize(&crop)?;
        self.model.predict(&sample)
    }
}

impl FaceClassifier for KnnFaceClassifier {
    fn classify(&self, frame: &Frame, face: &BoundingBox) -> Classification {
        match self.predict(frame, face) {
            Ok(identity) => {
                debug!(%identity, ?face, "face classified");
                Classification::Identity(identity)
            }
            Err(e) => {
                warn!(error = %e, ?face, "face classification failed");
                Classification::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> Identity {
        Identity::new(label).unwrap()
    }

    /// 2x2 grayscale model: alice is dark, bob is bright.
    fn classifier() -> KnnFaceClassifier {
        let model = KnnClassifier::fit(
            vec![vec![10.0; 4], vec![200.0; 4]],
            vec![id("alice"), id("bob")],
            1,
        )
        .unwrap();
        KnnFaceClassifier::new(FaceNormalizer::new(2), model)
    }

    #[test]
    fn test_classify_whole_frame() {
        let frame = Frame::filled(8, 8, 12);
        let result = classifier().classify(&frame, &frame.bounds());
        assert_eq!(result, Classification::Identity(id("alice")));
        assert_eq!(result.to_string(), "alice");
    }

    #[test]
    fn test_classify_each_face_in_frame() {
        // Left half dark, right half bright.
        let mut data = Vec::new();
        for _ in 0..4 {
            data.extend_from_slice(&[10, 10, 200, 200]);
        }
        let frame = Frame::gray(4, 4, data).unwrap();
        let classifier = classifier();

        let left = classifier.classify(&frame, &BoundingBox::new(0, 0, 2, 4));
        let right = classifier.classify(&frame, &BoundingBox::new(2, 0, 2, 4));

        assert_eq!(left.identity(), Some(&id("alice")));
        assert_eq!(right.identity(), Some(&id("bob")));
    }

    #[test]
    fn test_dimension_mismatch_is_unknown() {
        // Color crop yields 12 values against a 4-value model.
        let frame = Frame::new(2, 2, 3, vec![10; 12]).unwrap();
        let result = classifier().classify(&frame, &frame.bounds());
        assert!(result.is_unknown());
    }

    #[test]
    fn test_undersized_model_is_unknown() {
        let model = KnnClassifier::fit(vec![vec![10.0; 4]], vec![id("alice")], 5).unwrap();
        let classifier = KnnFaceClassifier::new(FaceNormalizer::new(2), model);

        let frame = Frame::filled(2, 2, 10);
        assert!(classifier.classify(&frame, &frame.bounds()).is_unknown());
    }

    #[test]
    fn test_box_outside_frame_is_unknown() {
        let frame = Frame::filled(4, 4, 10);
        let result = classifier().classify(&frame, &BoundingBox::new(10, 10, 2, 2));
        assert_eq!(result, Classification::Unknown);
        assert_eq!(result.to_string(), "Unknown");
    }
}
