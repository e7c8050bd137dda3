//! Mock device implementations for testing and development.
//!
//! This module provides simulated peripherals that can be controlled
//! programmatically without physical hardware. Input devices (camera, token
//! reader) are paired with a handle that feeds them events over a channel.
//! Output devices (actuator, pins, display, speaker) are paired with a
//! probe that exposes everything written to them.

pub mod actuator;
pub mod camera;
pub mod detector;
pub mod display;
pub mod pin;
pub mod speaker;
pub mod token;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// Re-export commonly used types
pub use actuator::{MockActuator, MockActuatorProbe};
pub use camera::{MockCamera, MockCameraHandle};
pub use detector::MockFaceDetector;
pub use display::{MockDisplay, MockDisplayProbe};
pub use pin::{MockPin, MockPinProbe};
pub use speaker::{MockSpeaker, MockSpeakerProbe};
pub use token::{MockTokenReader, MockTokenReaderHandle};

/// Append-only record of values written to a mock output, shared between
/// the device and its probe.
#[derive(Debug)]
pub(crate) struct Recording<T> {
    entries: Arc<Mutex<Vec<T>>>,
    failing: Arc<AtomicBool>,
}

impl<T> Clone for Recording<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            failing: Arc::clone(&self.failing),
        }
    }
}

impl<T: Clone> Recording<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        // A panicking test thread must not hide the entries from the others.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn push(&self, value: T) {
        self.guard().push(value);
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.guard().clone()
    }

    pub(crate) fn last(&self) -> Option<T> {
        self.guard().last().cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.guard().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.guard().clear();
    }

    pub(crate) fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}
