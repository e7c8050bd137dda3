//! Mock face detector.

use crate::{
    traits::FaceDetector,
    types::{BoundingBox, Frame},
};

#[derive(Debug, Clone)]
enum DetectionMode {
    WholeFrame,
    Fixed(Vec<BoundingBox>),
}

/// Deterministic face detector for tests and emulation.
///
/// A blank (all-zero) frame never contains a face. Any other frame yields
/// either one box covering the whole frame or a fixed set of boxes.
#[derive(Debug, Clone)]
pub struct MockFaceDetector {
    mode: DetectionMode,
}

impl MockFaceDetector {
    /// Report the whole frame as one face.
    pub fn new() -> Self {
        Self {
            mode: DetectionMode::WholeFrame,
        }
    }

    /// Report `boxes`, in order, for every non-blank frame.
    pub fn with_boxes(boxes: Vec<BoundingBox>) -> Self {
        Self {
            mode: DetectionMode::Fixed(boxes),
        }
    }
}

impl Default for MockFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect_faces(&self, frame: &Frame) -> Vec<BoundingBox> {
        if frame.is_blank() {
            return Vec::new();
        }

        match &self.mode {
            DetectionMode::WholeFrame => vec![frame.bounds()],
            DetectionMode::Fixed(boxes) => boxes.clone(),
        }
    }
}
