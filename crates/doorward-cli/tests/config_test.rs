//! The shipped configuration and sample enrollment data load and agree
//! with each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use doorward_biometric::{
    Classification, FaceClassifier, FaceNormalizer, KnnClassifier, KnnFaceClassifier,
};
use doorward_cli::FaceLibrary;
use doorward_controller::ControllerConfig;
use doorward_core::{EnrollmentData, EnrollmentPaths, Identity};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn shipped() -> (ControllerConfig, EnrollmentData) {
    let root = workspace_root();
    let config = ControllerConfig::from_file(root.join("config/doorward.toml")).unwrap();

    let paths = EnrollmentPaths {
        labels: root.join(&config.enrollment.labels),
        faces: root.join(&config.enrollment.faces),
        tokens: root.join(&config.enrollment.tokens),
    };
    let enrollment = EnrollmentData::load(&paths).unwrap();
    (config, enrollment)
}

#[test]
fn test_shipped_config_matches_defaults() {
    let (config, _) = shipped();
    let defaults = ControllerConfig::default();

    assert_eq!(config.session, defaults.session);
    assert_eq!(config.classifier, defaults.classifier);
    assert_eq!(config.enrollment, defaults.enrollment);
    assert_eq!(config.remote.server.bind_addr.port(), 7300);
}

#[test]
fn test_sample_enrollment_fits_classifier() {
    let (config, enrollment) = shipped();

    let side = config.classifier.face_side;
    assert_eq!(enrollment.dimension(), side * side);

    let registry = enrollment.registry().unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry
            .lookup(&Identity::new("alice").unwrap())
            .unwrap()
            .as_str(),
        "584190234871"
    );
}

#[test]
fn test_emulated_faces_classify_as_their_owner() {
    let (config, enrollment) = shipped();
    let model = KnnClassifier::from_enrollment(&enrollment, config.classifier.neighbors).unwrap();
    let classifier =
        KnnFaceClassifier::new(FaceNormalizer::new(config.classifier.face_side), model);
    let faces = FaceLibrary::new(Arc::new(enrollment), config.classifier.face_side).unwrap();

    for label in ["alice", "bob"] {
        let identity = Identity::new(label).unwrap();
        let frame = faces.frame_of(&identity).unwrap();
        assert_eq!(
            classifier.classify(&frame, &frame.bounds()),
            Classification::Identity(identity)
        );
    }
}
