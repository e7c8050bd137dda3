//! Access session state machine.
//!
//! One machine tracks one access attempt, from the moment a face is
//! classified until the door is back at rest.
//!
//! # States
//!
//! - `Idle`: no session in progress
//! - `FaceMatched`: a face was classified, inspection unlock in progress
//! - `AwaitingToken`: waiting for the RFID token
//! - `Verifying`: checking the token against the registry
//! - `Granted`: token matched, door unlocked
//! - `Denied(reason)`: mismatch, unknown identity or reader failure
//!
//! # Valid Transitions
//!
//! - Idle → FaceMatched → AwaitingToken → Verifying → Granted → Idle
//! - AwaitingToken → Denied(ReaderError) → Idle
//! - Verifying → Denied(Mismatch | UnknownIdentity) → Idle
//!
//! # Examples
//!
//! ```
//! use doorward_controller::{SessionState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! machine.transition_to(SessionState::FaceMatched).unwrap();
//! machine.transition_to(SessionState::AwaitingToken).unwrap();
//! assert_eq!(machine.current_state(), &SessionState::AwaitingToken);
//!
//! // Skipping verification is rejected
//! assert!(machine.transition_to(SessionState::Granted).is_err());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doorward_core::{Error, Result};

/// Longest valid session: Idle → FaceMatched → AwaitingToken → Verifying →
/// outcome → Idle.
const SESSION_TRANSITIONS: usize = 5;

/// Why a session ended in `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Token does not belong to the recognized identity.
    Mismatch,

    /// Recognized label has no enrollment record.
    UnknownIdentity,

    /// Token could not be read.
    ReaderError,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DenialReason::Mismatch => "Mismatch",
            DenialReason::UnknownIdentity => "UnknownIdentity",
            DenialReason::ReaderError => "ReaderError",
        };
        write!(f, "{reason}")
    }
}

/// All states of an access session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session in progress.
    Idle,

    /// A face was classified as an enrolled label.
    FaceMatched,

    /// Waiting for the token to be presented.
    AwaitingToken,

    /// Checking the observed token against the registry.
    Verifying,

    /// Token matched the recognized identity.
    Granted,

    /// Session rejected.
    Denied(DenialReason),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::FaceMatched => write!(f, "FaceMatched"),
            SessionState::AwaitingToken => write!(f, "AwaitingToken"),
            SessionState::Verifying => write!(f, "Verifying"),
            SessionState::Granted => write!(f, "Granted"),
            SessionState::Denied(reason) => write!(f, "Denied({reason})"),
        }
    }
}

impl SessionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorward_controller::{DenialReason, SessionState};
    ///
    /// assert!(SessionState::Idle.can_transition_to(&SessionState::FaceMatched));
    /// assert!(SessionState::AwaitingToken
    ///     .can_transition_to(&SessionState::Denied(DenialReason::ReaderError)));
    /// assert!(!SessionState::AwaitingToken
    ///     .can_transition_to(&SessionState::Denied(DenialReason::Mismatch)));
    /// ```
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            // From Idle
            (SessionState::Idle, SessionState::FaceMatched)
            // From FaceMatched
            | (SessionState::FaceMatched, SessionState::AwaitingToken)
            // From AwaitingToken
            | (SessionState::AwaitingToken, SessionState::Verifying)
            | (SessionState::AwaitingToken, SessionState::Denied(DenialReason::ReaderError))
            // From Verifying
            | (SessionState::Verifying, SessionState::Granted)
            | (
                SessionState::Verifying,
                SessionState::Denied(DenialReason::Mismatch | DenialReason::UnknownIdentity)
            )
            // Outcomes
            | (SessionState::Granted, SessionState::Idle)
            | (SessionState::Denied(_), SessionState::Idle)
        )
    }
}

/// A single state transition with its wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SessionState,

    /// The state transitioned to.
    pub to: SessionState,

    /// Wall-clock time of the transition.
    pub at: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// State machine for one access session.
///
/// Always starts in `Idle`; the only way forward is through
/// [`StateMachine::transition_to`]. Each session owns its machine.
#[derive(Debug)]
pub struct StateMachine {
    current_state: SessionState,
    history: Vec<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Idle,
            history: Vec::with_capacity(SESSION_TRANSITIONS),
        }
    }

    pub fn current_state(&self) -> &SessionState {
        &self.current_state
    }

    /// Transitions so far, oldest first.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// States visited so far, starting with the first `from` state.
    pub fn path(&self) -> Vec<SessionState> {
        let mut path: Vec<SessionState> =
            self.history.first().map(|t| t.from).into_iter().collect();
        path.extend(self.history.iter().map(|t| t.to));
        path
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if `new_state` is not
    /// reachable from the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;
        self.history.push(transition.clone());

        Ok(transition)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MISMATCH: SessionState = SessionState::Denied(DenialReason::Mismatch);
    const UNKNOWN: SessionState = SessionState::Denied(DenialReason::UnknownIdentity);
    const READER: SessionState = SessionState::Denied(DenialReason::ReaderError);

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), &SessionState::Idle);
        assert!(machine.history().is_empty());
        assert!(machine.path().is_empty());
    }

    #[test]
    fn test_granted_path() {
        let mut machine = StateMachine::new();
        for state in [
            SessionState::FaceMatched,
            SessionState::AwaitingToken,
            SessionState::Verifying,
            SessionState::Granted,
            SessionState::Idle,
        ] {
            machine.transition_to(state).unwrap();
        }

        assert_eq!(
            machine.path(),
            vec![
                SessionState::Idle,
                SessionState::FaceMatched,
                SessionState::AwaitingToken,
                SessionState::Verifying,
                SessionState::Granted,
                SessionState::Idle,
            ]
        );
    }

    #[rstest]
    #[case(SessionState::Idle, SessionState::FaceMatched, true)]
    #[case(SessionState::Idle, SessionState::AwaitingToken, false)]
    #[case(SessionState::Idle, SessionState::Granted, false)]
    #[case(SessionState::FaceMatched, SessionState::AwaitingToken, true)]
    #[case(SessionState::FaceMatched, SessionState::Idle, false)]
    #[case(SessionState::AwaitingToken, SessionState::Verifying, true)]
    #[case(SessionState::AwaitingToken, READER, true)]
    #[case(SessionState::AwaitingToken, MISMATCH, false)]
    #[case(SessionState::AwaitingToken, SessionState::Granted, false)]
    #[case(SessionState::Verifying, SessionState::Granted, true)]
    #[case(SessionState::Verifying, MISMATCH, true)]
    #[case(SessionState::Verifying, UNKNOWN, true)]
    #[case(SessionState::Verifying, READER, false)]
    #[case(SessionState::Granted, SessionState::Idle, true)]
    #[case(SessionState::Granted, SessionState::FaceMatched, false)]
    #[case(MISMATCH, SessionState::Idle, true)]
    #[case(READER, SessionState::Idle, true)]
    #[case(UNKNOWN, SessionState::Verifying, false)]
    fn test_can_transition_to(
        #[case] from: SessionState,
        #[case] to: SessionState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), allowed);
    }

    #[test]
    fn test_invalid_transition_leaves_state_unchanged() {
        let mut machine = StateMachine::new();
        machine.transition_to(SessionState::FaceMatched).unwrap();

        let result = machine.transition_to(SessionState::Granted);
        assert!(matches!(
            result,
            Err(Error::InvalidStateTransition { ref from, ref to })
                if from == "FaceMatched" && to == "Granted"
        ));
        assert_eq!(machine.current_state(), &SessionState::FaceMatched);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_granted_only_after_face_and_verification() {
        const ALL: [SessionState; 8] = [
            SessionState::Idle,
            SessionState::FaceMatched,
            SessionState::AwaitingToken,
            SessionState::Verifying,
            SessionState::Granted,
            MISMATCH,
            UNKNOWN,
            READER,
        ];

        // Every attempted sequence of up to five steps from a fresh machine
        let mut frontier = vec![Vec::<SessionState>::new()];
        for _ in 0..SESSION_TRANSITIONS {
            let mut next = Vec::new();
            for attempts in &frontier {
                for state in ALL {
                    let mut attempts = attempts.clone();
                    attempts.push(state);

                    let mut machine = StateMachine::new();
                    for target in &attempts {
                        let _ = machine.transition_to(*target);
                    }

                    let path = machine.path();
                    if let Some(granted) = path.iter().position(|s| *s == SessionState::Granted) {
                        assert!(path[..granted].contains(&SessionState::FaceMatched));
                        assert_eq!(path[granted - 1], SessionState::Verifying);
                    }
                    next.push(attempts);
                }
            }
            frontier = next;
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::AwaitingToken.to_string(), "AwaitingToken");
        assert_eq!(READER.to_string(), "Denied(ReaderError)");
    }

    #[test]
    fn test_state_serialization() {
        let serialized = serde_json::to_string(&SessionState::AwaitingToken).unwrap();
        assert_eq!(serialized, "\"awaiting_token\"");

        let serialized = serde_json::to_string(&MISMATCH).unwrap();
        assert_eq!(serialized, r#"{"denied":"mismatch"}"#);

        let deserialized: SessionState = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, MISMATCH);
    }

    #[test]
    fn test_transition_serialization() {
        let transition = StateTransition::new(SessionState::Idle, SessionState::FaceMatched);
        let serialized = serde_json::to_string(&transition).unwrap();

        assert!(serialized.contains("\"idle\""));
        assert!(serialized.contains("\"face_matched\""));
        assert!(serialized.contains("\"at\""));

        let deserialized: StateTransition = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.to, SessionState::FaceMatched);
        assert_eq!(deserialized.at, transition.at);
    }
}
