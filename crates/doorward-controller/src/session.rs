//! One access attempt, from face match to the door at rest.
//!
//! # Sequence
//!
//! ```text
//! FaceMatched     "Door is Open / Welcome", lamp + ventilation on,
//!                 unlock, inspection dwell, lock
//! AwaitingToken   "Open Door / Put RFID Card", read token (timeout)
//!   └─ read error ──> Denied(ReaderError)  "RFID Error!", reader-error delay
//! Verifying       registry lookup
//!   ├─ match ──────> Granted   unlock, grant dwell, lock, beeps,
//!   │                          "Access Granted / Welcome <name>", hold, clear
//!   ├─ mismatch ───> Denied(Mismatch)         "Card doesn't match", denial delay
//!   └─ no record ──> Denied(UnknownIdentity)  "Unknown Person", denial delay
//! Idle
//! ```
//!
//! Actuator and output failures are logged and do not change the outcome.
//! The only error a session returns is a broken transition invariant.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use doorward_core::messages::{DisplayMessages, SpokenPhrases};
use doorward_core::{Identity, TokenId, TokenVerifier, Verification};
use doorward_hardware::{BuzzerPattern, LockActuator, OutputPin, PeripheralFacade, TokenReader};
use doorward_hardware::{Buzzer, Speaker, TextDisplay};

use crate::config::SessionTiming;
use crate::feedback::Feedback;
use crate::state_machine::{DenialReason, SessionState, StateMachine};
use crate::Result;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Granted,
    Denied(DenialReason),
}

impl SessionOutcome {
    pub fn is_granted(self) -> bool {
        matches!(self, SessionOutcome::Granted)
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub identity: Identity,
    pub outcome: SessionOutcome,
    /// Every state visited, starting and ending at `Idle`.
    pub path: Vec<SessionState>,
    pub token: Option<TokenId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A session in progress.
#[derive(Debug)]
pub struct AccessSession {
    id: Uuid,
    identity: Identity,
    machine: StateMachine,
    token: Option<TokenId>,
    started_at: DateTime<Utc>,
}

impl AccessSession {
    pub fn new(identity: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            machine: StateMachine::new(),
            token: None,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        *self.machine.current_state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Move to `to`, rejecting transitions the state machine forbids.
    pub fn advance(&mut self, to: SessionState) -> Result<()> {
        let transition = self.machine.transition_to(to)?;
        info!(
            session = %self.id,
            identity = %self.identity,
            from = %transition.from,
            to = %transition.to,
            "session transition"
        );
        Ok(())
    }

    /// Close the session. It must already be back at `Idle`.
    pub fn finish(self, outcome: SessionOutcome) -> SessionReport {
        SessionReport {
            id: self.id,
            identity: self.identity,
            outcome,
            path: self.machine.path(),
            token: self.token,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Borrowed collaborators one session runs against.
pub struct SessionContext<'a, R, A, P, D, B, S> {
    pub reader: &'a mut R,
    pub facade: &'a PeripheralFacade<A, P>,
    pub feedback: &'a mut Feedback<D, B, S>,
    pub verifier: &'a TokenVerifier,
    pub timing: &'a SessionTiming,
}

impl<R, A, P, D, B, S> SessionContext<'_, R, A, P, D, B, S>
where
    R: TokenReader,
    A: LockActuator,
    P: OutputPin,
    D: TextDisplay,
    B: Buzzer,
    S: Speaker,
{
    /// Run a full session for a classified identity.
    pub async fn run(&mut self, identity: Identity) -> Result<SessionReport> {
        let mut session = AccessSession::new(identity);
        info!(session = %session.id(), identity = %session.identity(), "face matched");

        session.advance(SessionState::FaceMatched)?;
        self.inspect().await;

        session.advance(SessionState::AwaitingToken)?;
        self.feedback.show(DisplayMessages::AWAITING_TOKEN).await;
        self.feedback.say(SpokenPhrases::AWAITING_TOKEN).await;

        let outcome = match self
            .reader
            .read_token(self.timing.token_read_timeout())
            .await
        {
            Err(e) => {
                warn!(session = %session.id(), error = %e, "token read failed");
                session.advance(SessionState::Denied(DenialReason::ReaderError))?;
                self.deny(DenialReason::ReaderError).await;
                SessionOutcome::Denied(DenialReason::ReaderError)
            }
            Ok(read) => {
                session.advance(SessionState::Verifying)?;
                let verification = self.verifier.verify(session.identity(), &read.token_id);
                session.token = Some(read.token_id);

                match verification {
                    Verification::Match => {
                        session.advance(SessionState::Granted)?;
                        info!(session = %session.id(), identity = %session.identity(), "access granted");
                        self.grant(session.identity()).await;
                        SessionOutcome::Granted
                    }
                    Verification::Mismatch => {
                        let reason = DenialReason::Mismatch;
                        session.advance(SessionState::Denied(reason))?;
                        warn!(session = %session.id(), identity = %session.identity(), "token does not match identity");
                        self.deny(reason).await;
                        SessionOutcome::Denied(reason)
                    }
                    Verification::UnknownIdentity => {
                        let reason = DenialReason::UnknownIdentity;
                        session.advance(SessionState::Denied(reason))?;
                        warn!(session = %session.id(), identity = %session.identity(), "identity has no enrollment record");
                        self.deny(reason).await;
                        SessionOutcome::Denied(reason)
                    }
                }
            }
        };

        session.advance(SessionState::Idle)?;
        Ok(session.finish(outcome))
    }

    /// Welcome the matched person and hold the door for inspection.
    async fn inspect(&mut self) {
        self.feedback.show(DisplayMessages::FACE_MATCHED).await;
        self.feedback.say(SpokenPhrases::FACE_MATCHED).await;

        if let Err(e) = self.facade.set_lamp(true).await {
            warn!(error = %e, "lamp on failed");
        }
        if let Err(e) = self.facade.set_ventilation(true).await {
            warn!(error = %e, "ventilation on failed");
        }

        self.hold_open(self.timing.inspection_dwell()).await;
    }

    async fn grant(&mut self, identity: &Identity) {
        self.hold_open(self.timing.grant_dwell()).await;

        self.feedback.beep(BuzzerPattern::grant()).await;
        let welcome = DisplayMessages::welcome(identity.as_str());
        self.feedback
            .show((DisplayMessages::ACCESS_GRANTED, &welcome))
            .await;
        self.feedback
            .say(&SpokenPhrases::granted(identity.as_str()))
            .await;
        sleep(self.timing.grant_message_hold()).await;
        self.feedback.clear().await;
    }

    async fn deny(&mut self, reason: DenialReason) {
        let (message, phrase, delay) = match reason {
            DenialReason::Mismatch => (
                DisplayMessages::TOKEN_MISMATCH,
                SpokenPhrases::TOKEN_MISMATCH,
                self.timing.denial_delay(),
            ),
            DenialReason::UnknownIdentity => (
                DisplayMessages::UNKNOWN_PERSON,
                SpokenPhrases::UNKNOWN_PERSON,
                self.timing.denial_delay(),
            ),
            DenialReason::ReaderError => (
                DisplayMessages::READER_ERROR,
                SpokenPhrases::READER_ERROR,
                self.timing.reader_error_delay(),
            ),
        };

        self.feedback.show(message).await;
        self.feedback.say(phrase).await;
        sleep(delay).await;
    }

    /// Unlock, wait, lock. Latch failures are logged only.
    async fn hold_open(&self, dwell: std::time::Duration) {
        if let Err(e) = self.facade.unlock().await {
            error!(error = %e, "unlock failed");
        }
        sleep(dwell).await;
        if let Err(e) = self.facade.lock().await {
            error!(error = %e, "lock failed");
        }
    }
}
