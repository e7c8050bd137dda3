use thiserror::Error;

use doorward_biometric::BiometricError;
use doorward_hardware::HardwareError;
use doorward_network::RemoteError;

/// Errors that stop the door controller.
///
/// Peripheral failures inside a session are logged and do not appear here;
/// only camera failures, startup problems and broken session invariants do.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Camera failure: {0}")]
    Camera(#[source] HardwareError),

    #[error(transparent)]
    Core(#[from] doorward_core::Error),

    #[error("Classifier setup failed: {0}")]
    Classifier(#[from] BiometricError),

    #[error("Remote control failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControllerError {
    pub fn config(message: impl Into<String>) -> Self {
        ControllerError::Config(message.into())
    }

    /// Whether this error came from the camera.
    pub fn is_camera(&self) -> bool {
        matches!(self, ControllerError::Camera(_))
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_display() {
        let err = ControllerError::Camera(HardwareError::frame_capture("sensor unplugged"));
        assert!(err.is_camera());
        assert!(err.to_string().starts_with("Camera failure"));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ControllerError = doorward_core::Error::EmptyEnrollment.into();
        assert!(!err.is_camera());
        assert_eq!(err.to_string(), "Enrollment data is empty");
    }
}
