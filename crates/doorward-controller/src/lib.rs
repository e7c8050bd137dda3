//! Door controller for Doorward.
//!
//! This crate ties the peripherals, the face classifier and the token
//! registry into the two-factor access loop, and exposes the shared output
//! facade to the remote-control channel.
//!
//! # Components
//!
//! - **DoorController**: camera loop, face classification and session dispatch
//! - **AccessSession**: one face-then-token attempt, driven by the
//!   [`StateMachine`]
//! - **RemoteControl**: lamp and ventilation commands from the network
//! - **ControllerConfig**: TOML configuration with defaults for every field

pub mod config;
pub mod controller;
pub mod devices;
pub mod error;
pub mod feedback;
pub mod remote;
pub mod session;
pub mod state_machine;

pub use config::{ClassifierConfig, ControllerConfig, RemoteConfig, SessionTiming};
pub use controller::DoorController;
pub use devices::{DoorDevices, DoorParts, MockDevices, MockRig, SharedFacade};
pub use error::{ControllerError, Result};
pub use feedback::Feedback;
pub use remote::{RemoteControl, dispatch, run_dispatcher};
pub use session::{AccessSession, SessionContext, SessionOutcome, SessionReport};
pub use state_machine::{DenialReason, SessionState, StateMachine, StateTransition};
