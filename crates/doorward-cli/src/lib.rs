//! Command-line front end for the Doorward door controller.
//!
//! The `doorward` binary runs the controller against emulated peripherals
//! driven from stdin, checks configuration and enrollment data, and sends
//! remote lamp/fan commands to a running controller.

pub mod emulator;

pub use emulator::{FaceLibrary, RigCommand};
