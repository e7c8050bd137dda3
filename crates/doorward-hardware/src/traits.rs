//! Peripheral trait definitions.
//!
//! These traits are the contract between the door controller and its
//! collaborators. Each one has a mock in [`crate::mock`] and can be backed
//! by a real driver behind a `hardware-*` feature.
//!
//! Async methods are declared as `fn -> impl Future + Send` so generic code
//! can move their futures across Tokio worker threads. Implementations may
//! still be written with plain `async fn`.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::types::{BoundingBox, BuzzerPattern, DeviceInfo, Frame, LockPosition, TokenRead};

/// Frame source (USB camera, CSI camera, recorded clip).
pub trait Camera: Send + Sync {
    /// Capture the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot deliver a frame. The controller
    /// treats this as fatal and begins shutdown.
    fn next_frame(&mut self) -> impl Future<Output = Result<Frame>> + Send;

    /// Release the underlying device. Further captures fail until
    /// [`reopen`](Camera::reopen) is called.
    fn release(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Acquire the device again after a release.
    fn reopen(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Device metadata.
    fn device_info(&self) -> DeviceInfo;
}

/// Locates faces in a frame.
///
/// Detection is synchronous; an empty result means no face is present.
pub trait FaceDetector: Send + Sync {
    fn detect_faces(&self, frame: &Frame) -> Vec<BoundingBox>;
}

/// Proximity token reader (RFID/NFC).
pub trait TokenReader: Send + Sync {
    /// Block until a token is presented or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Timeout` when no token arrives in time and
    /// another error if the token cannot be read.
    fn read_token(&mut self, timeout: Duration) -> impl Future<Output = Result<TokenRead>> + Send;

    fn device_info(&self) -> DeviceInfo;
}

/// Door latch driver (servo, solenoid).
pub trait LockActuator: Send + Sync {
    /// Drive the latch to `position`.
    fn set_position(&mut self, position: LockPosition)
    -> impl Future<Output = Result<()>> + Send;

    /// Stop driving the latch and release the output.
    fn release(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn device_info(&self) -> DeviceInfo;
}

/// A single digital output line (lamp relay, fan relay, buzzer).
pub trait OutputPin: Send + Sync {
    /// Drive the line high (`true`) or low (`false`).
    fn set(&mut self, on: bool) -> impl Future<Output = Result<()>> + Send;

    fn device_info(&self) -> DeviceInfo;
}

/// Two-line character display.
pub trait TextDisplay: Send + Sync {
    /// Replace both lines.
    fn show(&mut self, line1: &str, line2: &str) -> impl Future<Output = Result<()>> + Send;

    /// Blank the display.
    fn clear(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Audible beeper.
pub trait Buzzer: Send + Sync {
    /// Play `pattern`, returning once it has finished.
    fn sound(&mut self, pattern: BuzzerPattern) -> impl Future<Output = Result<()>> + Send;
}

/// Text-to-speech output.
pub trait Speaker: Send + Sync {
    fn speak(&mut self, phrase: &str) -> impl Future<Output = Result<()>> + Send;
}
