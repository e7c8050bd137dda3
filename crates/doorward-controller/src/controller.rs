//! The door controller main loop.
//!
//! # Loop
//!
//! ```text
//! banner ─> ┌─> "Put Face in Front / of Camera"
//!           │   next frame ──(error)──> fatal, cleanup
//!           │   for each detected face:
//!           │       classify ─ Unknown ─> skip
//!           │       run session
//!           │       granted? release camera, cool-down, reopen
//!           └── until shutdown is requested
//! ```
//!
//! Shutdown is checked between frames; a session in progress always runs
//! to completion. Cleanup (camera release, outputs to a safe state, latch
//! release) runs exactly once on every exit path.

use std::collections::VecDeque;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use doorward_biometric::{Classification, FaceClassifier};
use doorward_core::messages::DisplayMessages;
use doorward_core::{Identity, TokenVerifier};
use doorward_hardware::{Camera, FaceDetector, Frame};

use crate::config::SessionTiming;
use crate::devices::{DoorDevices, DoorParts, SharedFacade};
use crate::feedback::Feedback;
use crate::session::{SessionContext, SessionReport};
use crate::{ControllerError, Result};

/// Number of finished session reports kept in memory.
const MAX_RECENT_SESSIONS: usize = 32;

/// Face-and-token door controller.
pub struct DoorController<Dv: DoorDevices> {
    camera: Dv::Camera,
    detector: Dv::Detector,
    classifier: Dv::Classifier,
    reader: Dv::Reader,
    facade: SharedFacade<Dv>,
    feedback: Feedback<Dv::Display, Dv::Buzzer, Dv::Speaker>,
    verifier: TokenVerifier,
    timing: SessionTiming,
    recent: VecDeque<SessionReport>,
    released: bool,
}

impl<Dv: DoorDevices> DoorController<Dv> {
    pub fn new(parts: DoorParts<Dv>, verifier: TokenVerifier, timing: SessionTiming) -> Self {
        let DoorParts {
            camera,
            detector,
            classifier,
            reader,
            facade,
            display,
            buzzer,
            speaker,
        } = parts;

        Self {
            camera,
            detector,
            classifier,
            reader,
            facade,
            feedback: Feedback::new(display, buzzer, speaker),
            verifier,
            timing,
            recent: VecDeque::with_capacity(MAX_RECENT_SESSIONS),
            released: false,
        }
    }

    /// Shared output facade, for the remote-control dispatcher.
    pub fn facade(&self) -> SharedFacade<Dv> {
        self.facade.clone()
    }

    /// Finished sessions, oldest first.
    pub fn recent_sessions(&self) -> &VecDeque<SessionReport> {
        &self.recent
    }

    /// Run until `shutdown` becomes `true` or the camera fails.
    ///
    /// Cleanup runs before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Camera` when a frame cannot be captured or
    /// the camera cannot be reopened after a grant.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let result = self.run_loop(shutdown).await;
        match &result {
            Ok(()) => info!("door controller stopping on request"),
            Err(e) => error!(error = %e, "door controller stopped on fatal error"),
        }
        self.shutdown().await;
        result
    }

    async fn run_loop(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.feedback.show(DisplayMessages::BANNER).await;
        sleep(self.timing.banner_hold()).await;
        self.feedback.clear().await;

        loop {
            self.feedback.show(DisplayMessages::AWAITING_FACE).await;

            let frame = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => return Ok(()),
                frame = self.camera.next_frame() => frame.map_err(ControllerError::Camera)?,
            };

            self.process_frame(&frame).await?;
        }
    }

    async fn process_frame(&mut self, frame: &Frame) -> Result<()> {
        let faces = self.detector.detect_faces(frame);
        trace!(
            width = frame.width(),
            height = frame.height(),
            faces = faces.len(),
            "frame processed"
        );

        for face in faces {
            let identity = match self.classifier.classify(frame, &face) {
                Classification::Identity(identity) => identity,
                Classification::Unknown => {
                    debug!(?face, "face not classified");
                    continue;
                }
            };

            let report = self.run_session(identity).await?;
            let granted = report.outcome.is_granted();
            self.record(report);

            if granted {
                self.cycle_camera().await?;
            }
        }

        Ok(())
    }

    async fn run_session(&mut self, identity: Identity) -> Result<SessionReport> {
        let mut ctx = SessionContext {
            reader: &mut self.reader,
            facade: self.facade.as_ref(),
            feedback: &mut self.feedback,
            verifier: &self.verifier,
            timing: &self.timing,
        };
        ctx.run(identity).await
    }

    fn record(&mut self, report: SessionReport) {
        info!(
            session = %report.id,
            identity = %report.identity,
            outcome = ?report.outcome,
            "session finished"
        );
        self.recent.push_back(report);
        if self.recent.len() > MAX_RECENT_SESSIONS {
            self.recent.pop_front();
        }
    }

    /// Turn the camera off for the cool-down, then back on.
    async fn cycle_camera(&mut self) -> Result<()> {
        if let Err(e) = self.camera.release().await {
            warn!(error = %e, "camera release failed");
        }
        sleep(self.timing.camera_cooldown()).await;
        self.camera.reopen().await.map_err(ControllerError::Camera)?;
        debug!("camera reopened");
        Ok(())
    }

    /// Release every peripheral. Runs once; later calls do nothing.
    pub async fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.feedback.clear().await;
        if let Err(e) = self.camera.release().await {
            warn!(error = %e, "camera release failed during shutdown");
        }
        if let Err(e) = self.facade.safe_state().await {
            warn!(error = %e, "outputs not fully reset during shutdown");
        }
        if let Err(e) = self.facade.release().await {
            warn!(error = %e, "latch release failed during shutdown");
        }
        info!("peripherals released");
    }
}

/// Resolve once shutdown is requested. A dropped sender never resolves.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
