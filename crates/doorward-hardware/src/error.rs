//! Error types for peripheral operations.
//!
//! Every collaborator of the door controller (camera, token reader, latch
//! actuator, output pins, display, speech) reports failures through
//! [`HardwareError`]. Callers decide which failures are fatal: a camera
//! frame failure ends the main loop, a token read failure only denies the
//! current session, and feedback failures are logged and ignored.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device was used after it had been released.
    #[error("Device released: {device}")]
    Released { device: String },

    /// Camera could not deliver a frame.
    #[error("Frame capture error: {message}")]
    FrameCaptureError { message: String },

    /// Token reader failed to produce a token.
    #[error("Token read error: {message}")]
    TokenReadError { message: String },

    /// Latch actuator rejected a position command.
    #[error("Actuator error: {message}")]
    ActuatorError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new released-device error.
    pub fn released(device: impl Into<String>) -> Self {
        Self::Released {
            device: device.into(),
        }
    }

    /// Create a new frame capture error.
    pub fn frame_capture(message: impl Into<String>) -> Self {
        Self::FrameCaptureError {
            message: message.into(),
        }
    }

    /// Create a new token read error.
    pub fn token_read(message: impl Into<String>) -> Self {
        Self::TokenReadError {
            message: message.into(),
        }
    }

    /// Create a new actuator error.
    pub fn actuator(message: impl Into<String>) -> Self {
        Self::ActuatorError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this error is a read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
