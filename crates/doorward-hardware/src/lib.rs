//! Peripheral abstraction layer for the Doorward door controller.
//!
//! This crate provides trait-based abstractions for everything the access
//! controller touches: the camera and face detector, the RFID token reader,
//! the latch actuator, the lamp/fan/buzzer output lines, the character LCD,
//! and speech output. Mock implementations for every trait live in
//! [`mock`] so the controller can run and be tested without hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: I/O methods return `impl Future + Send`, so
//!   implementations can be written with native `async fn`.
//! - **Generic, not dynamic**: the controller is generic over its
//!   collaborators; no trait objects are involved.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with [`HardwareError`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use doorward_hardware::traits::{LockActuator, TokenReader};
//! use doorward_hardware::types::LockPosition;
//! use doorward_hardware::Result;
//!
//! async fn open_for_card<R: TokenReader, A: LockActuator>(
//!     reader: &mut R,
//!     latch: &mut A,
//! ) -> Result<String> {
//!     let read = reader.read_token(Duration::from_secs(30)).await?;
//!     latch.set_position(LockPosition::Unlocked).await?;
//!     Ok(read.token_id.to_string())
//! }
//! ```
//!
//! # Shared outputs
//!
//! The latch, lamp, and ventilation are owned by [`PeripheralFacade`], which
//! serializes writes per output and is safe to share between the access
//! session and the remote-control listener.

pub mod buzzer;
pub mod error;
pub mod facade;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use buzzer::PinBuzzer;
pub use error::{HardwareError, Result};
pub use facade::{Output, OutputSnapshot, PeripheralFacade};
pub use traits::{
    Buzzer, Camera, FaceDetector, LockActuator, OutputPin, Speaker, TextDisplay, TokenReader,
};
pub use types::{BoundingBox, BuzzerPattern, DeviceInfo, Frame, LockPosition, TokenRead};
