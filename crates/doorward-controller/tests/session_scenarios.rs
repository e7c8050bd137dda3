//! End-to-end scenarios for the door controller on the mock rig.
//!
//! Time is paused, so dwell times and timeouts elapse instantly. Each test
//! queues camera frames and token reads, then ends the loop with a camera
//! failure or a shutdown request.

use std::sync::Arc;
use std::time::Duration;

use doorward_biometric::{FaceNormalizer, KnnClassifier, KnnFaceClassifier};
use doorward_controller::{
    ControllerError, DenialReason, DoorController, MockDevices, MockRig, SessionOutcome,
    SessionState, SessionTiming,
};
use doorward_core::{
    EnrolledRecord, EnrollmentData, Identity, IdentityRegistry, TokenId, TokenVerifier,
};
use doorward_hardware::{Frame, LockPosition};
use tokio::sync::watch;

const SIDE: u32 = 50;

/// (label, grey level, token). Carol has faces but no registry record.
const PEOPLE: [(&str, u8, &str); 3] = [
    ("alice", 10, "T1"),
    ("bob", 200, "T2"),
    ("carol", 120, "T3"),
];

fn id(label: &str) -> Identity {
    Identity::new(label).unwrap()
}

fn token(value: &str) -> TokenId {
    TokenId::new(value).unwrap()
}

fn classifier() -> KnnFaceClassifier {
    let mut labels = Vec::new();
    let mut faces = Vec::new();
    let mut tokens = Vec::new();
    for (label, level, tag) in PEOPLE {
        for _ in 0..3 {
            labels.push(id(label));
            faces.push(vec![f32::from(level); (SIDE * SIDE) as usize]);
            tokens.push(token(tag));
        }
    }

    let data = EnrollmentData::from_parts(labels, faces, tokens).unwrap();
    let model = KnnClassifier::from_enrollment(&data, 5).unwrap();
    KnnFaceClassifier::new(FaceNormalizer::new(SIDE as usize), model)
}

fn verifier() -> TokenVerifier {
    let registry = IdentityRegistry::from_records([
        EnrolledRecord::new(id("alice"), token("T1")),
        EnrolledRecord::new(id("bob"), token("T2")),
    ]);
    TokenVerifier::new(Arc::new(registry))
}

fn face_of(label: &str) -> Frame {
    let (_, level, _) = PEOPLE
        .iter()
        .find(|(name, _, _)| *name == label)
        .unwrap();
    Frame::filled(SIDE, SIDE, *level)
}

fn controller() -> (DoorController<MockDevices>, MockRig) {
    let timing = SessionTiming::default();
    let (parts, rig) = MockDevices::assemble(classifier(), timing.actuator_pulse());
    (DoorController::new(parts, verifier(), timing), rig)
}

/// Run until the camera fails, returning the loop's result.
async fn run_to_camera_failure(
    controller: &mut DoorController<MockDevices>,
    rig: &MockRig,
) -> Result<(), ControllerError> {
    rig.camera.fail_next("sensor unplugged").await.unwrap();
    let (_tx, rx) = watch::channel(false);
    controller.run(rx).await
}

fn shown(rig: &MockRig, line1: &str, line2: &str) -> bool {
    rig.display
        .history()
        .iter()
        .any(|(l1, l2)| l1 == line1 && l2 == line2)
}

fn outcomes(controller: &DoorController<MockDevices>) -> Vec<SessionOutcome> {
    controller
        .recent_sessions()
        .iter()
        .map(|report| report.outcome)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_matching_token_grants_access() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("alice")).await.unwrap();
    rig.reader.present_token(token("T1")).await.unwrap();

    let result = run_to_camera_failure(&mut controller, &rig).await;
    assert!(matches!(result, Err(ControllerError::Camera(_))));

    assert_eq!(outcomes(&controller), vec![SessionOutcome::Granted]);

    let report = &controller.recent_sessions()[0];
    assert_eq!(report.identity, id("alice"));
    assert_eq!(
        report.path,
        vec![
            SessionState::Idle,
            SessionState::FaceMatched,
            SessionState::AwaitingToken,
            SessionState::Verifying,
            SessionState::Granted,
            SessionState::Idle,
        ]
    );

    assert!(rig.display.has_shown("Access Granted"));
    assert!(shown(&rig, "Access Granted", "Welcome alice"));
    assert_eq!(rig.buzzer.history(), vec![true, false, true, false]);
    assert!(
        rig.speaker
            .phrases()
            .contains(&"Access granted, welcome alice".to_string())
    );

    // One cool-down cycle after the grant, then the final release
    assert_eq!(rig.camera.reopen_count(), 1);
    assert_eq!(rig.camera.release_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_token_is_denied() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("alice")).await.unwrap();
    rig.reader.present_token(token("T2")).await.unwrap();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    assert_eq!(
        outcomes(&controller),
        vec![SessionOutcome::Denied(DenialReason::Mismatch)]
    );
    let report = &controller.recent_sessions()[0];
    assert_eq!(report.path.last(), Some(&SessionState::Idle));
    // 16-column display truncates the first line
    assert!(shown(&rig, "Card doesn't mat", "Try again"));
    assert!(!rig.display.has_shown("Access Granted"));
    assert!(rig.buzzer.history().is_empty());

    // No cool-down after a denial
    assert_eq!(rig.camera.reopen_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unenrolled_identity_is_denied() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("carol")).await.unwrap();
    rig.reader.present_token(token("T3")).await.unwrap();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    assert_eq!(
        outcomes(&controller),
        vec![SessionOutcome::Denied(DenialReason::UnknownIdentity)]
    );
    assert_eq!(controller.recent_sessions()[0].identity, id("carol"));
    assert!(shown(&rig, "Unknown Person", "Access Denied"));

    // The inspection unlock still happened
    assert!(rig.latch.positions().contains(&LockPosition::Unlocked));
}

#[tokio::test(start_paused = true)]
async fn test_reader_error_does_not_stop_the_loop() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("bob")).await.unwrap();
    rig.reader.fail_next("CRC error").await.unwrap();
    rig.camera.push_frame(face_of("bob")).await.unwrap();
    rig.reader.present_token(token("T2")).await.unwrap();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    assert_eq!(
        outcomes(&controller),
        vec![
            SessionOutcome::Denied(DenialReason::ReaderError),
            SessionOutcome::Granted,
        ]
    );
    assert!(rig.display.has_shown("RFID Error!"));
    assert!(
        !controller.recent_sessions()[0]
            .path
            .contains(&SessionState::Verifying)
    );
}

#[tokio::test(start_paused = true)]
async fn test_token_timeout_is_a_reader_error() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("alice")).await.unwrap();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    assert_eq!(
        outcomes(&controller),
        vec![SessionOutcome::Denied(DenialReason::ReaderError)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_camera_failure_cleans_up_once() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("alice")).await.unwrap();
    rig.reader.present_token(token("T2")).await.unwrap();

    let result = run_to_camera_failure(&mut controller, &rig).await;
    assert!(matches!(result, Err(ControllerError::Camera(_))));

    // Session turned lamp and ventilation on; cleanup turned them off
    assert!(!rig.lamp.level());
    assert!(!rig.ventilation.level());
    assert_eq!(rig.latch.latched(), Some(LockPosition::Locked));
    assert_eq!(rig.latch.release_count(), 1);
    assert_eq!(rig.camera.release_count(), 1);
    assert!(!rig.camera.is_open());

    // A second shutdown is a no-op
    controller.shutdown().await;
    assert_eq!(rig.latch.release_count(), 1);
    assert_eq!(rig.camera.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_face_free_frame_starts_no_session() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(Frame::blank(SIDE, SIDE)).await.unwrap();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    assert!(controller.recent_sessions().is_empty());
    assert!(rig.latch.positions().iter().all(|p| *p != LockPosition::Unlocked));
    assert_eq!(rig.camera.frames_delivered(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_startup_banner_and_prompt() {
    let (mut controller, rig) = controller();

    run_to_camera_failure(&mut controller, &rig).await.unwrap_err();

    let history = rig.display.history();
    assert_eq!(
        history[0],
        ("Hi, welcome".to_string(), "Door Lock Unlock".to_string())
    );
    assert_eq!(
        history[2],
        ("Put Face in Fron".to_string(), "of Camera".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_manual_shutdown() {
    let (mut controller, rig) = controller();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let result = controller.run(rx).await;
        (controller, result)
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    tx.send(true).unwrap();

    let (controller, result) = task.await.unwrap();
    assert!(result.is_ok());
    assert!(controller.recent_sessions().is_empty());
    assert_eq!(rig.camera.release_count(), 1);
    assert_eq!(rig.latch.release_count(), 1);
    assert_eq!(rig.latch.latched(), Some(LockPosition::Locked));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_session_in_progress() {
    let (mut controller, rig) = controller();
    rig.camera.push_frame(face_of("alice")).await.unwrap();
    rig.reader.present_token(token("T1")).await.unwrap();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let result = controller.run(rx).await;
        (controller, result)
    });

    // Banner is 3 s; the session is well under way at 5 s
    tokio::time::sleep(Duration::from_secs(5)).await;
    tx.send(true).unwrap();

    let (controller, result) = task.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(outcomes(&controller), vec![SessionOutcome::Granted]);
    assert!(rig.display.has_shown("Access Granted"));
}

#[tokio::test(start_paused = true)]
async fn test_lamp_not_blocked_by_latch_pulse() {
    let (mut controller, rig) = controller();
    let facade = controller.facade();
    rig.camera.push_frame(face_of("bob")).await.unwrap();
    rig.reader.present_token(token("T2")).await.unwrap();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let result = controller.run(rx).await;
        (controller, result)
    });

    // Banner ends at 3 s; the inspection unlock pulse runs from 3 s to 4 s
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(facade.outputs().latch, LockPosition::Unlocked);
    assert!(facade.outputs().lamp);

    tokio::time::timeout(Duration::from_millis(1), facade.set_lamp(false))
        .await
        .expect("lamp write waited on the latch")
        .unwrap();
    assert!(!rig.lamp.level());

    tx.send(true).unwrap();
    let (controller, result) = task.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(outcomes(&controller), vec![SessionOutcome::Granted]);
}
