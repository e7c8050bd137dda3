//! Controller configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [session]
//! inspection_dwell_ms = 10000
//! token_read_timeout_ms = 30000
//!
//! [classifier]
//! neighbors = 5
//!
//! [enrollment]
//! labels = "data/names.json"
//!
//! [remote]
//! enabled = true
//! bind_addr = "0.0.0.0:7300"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use doorward_core::EnrollmentPaths;
use doorward_core::constants::{
    DEFAULT_ACTUATOR_PULSE_MS, DEFAULT_BANNER_HOLD_MS, DEFAULT_CAMERA_COOLDOWN_MS,
    DEFAULT_DENIAL_DELAY_MS, DEFAULT_FACE_SIDE, DEFAULT_GRANT_DWELL_MS,
    DEFAULT_GRANT_MESSAGE_HOLD_MS, DEFAULT_INSPECTION_DWELL_MS, DEFAULT_KNN_NEIGHBORS,
    DEFAULT_READER_ERROR_DELAY_MS, DEFAULT_TOKEN_READ_TIMEOUT_MS,
};
use doorward_network::RemoteServerConfig;

use crate::{ControllerError, Result};

/// Top-level controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub session: SessionTiming,
    pub classifier: ClassifierConfig,
    pub enrollment: EnrollmentPaths,
    pub remote: RemoteConfig,
}

impl ControllerConfig {
    /// Read and validate a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ControllerError::config(format!("failed to read {}: {e}", path.display()))
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ControllerError::Config(message) => {
                ControllerError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ControllerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.classifier.neighbors == 0 {
            return Err(ControllerError::config("classifier.neighbors must be at least 1"));
        }
        if self.classifier.face_side == 0 {
            return Err(ControllerError::config("classifier.face_side must be at least 1"));
        }
        if self.session.actuator_pulse_ms == 0 {
            return Err(ControllerError::config(
                "session.actuator_pulse_ms must be greater than zero",
            ));
        }
        if self.remote.enabled && self.remote.server.max_connections == 0 {
            return Err(ControllerError::config(
                "remote.max_connections must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Dwell times and timeouts of an access session, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionTiming {
    /// Unlock time while the matched person is inspected.
    pub inspection_dwell_ms: u64,

    /// Unlock time after a verified token.
    pub grant_dwell_ms: u64,

    /// How long the servo is driven before returning to neutral.
    pub actuator_pulse_ms: u64,

    pub token_read_timeout_ms: u64,

    /// Pause after a mismatch or unknown identity.
    pub denial_delay_ms: u64,

    pub reader_error_delay_ms: u64,

    pub grant_message_hold_ms: u64,

    /// Camera off time after a grant.
    pub camera_cooldown_ms: u64,

    pub banner_hold_ms: u64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            inspection_dwell_ms: DEFAULT_INSPECTION_DWELL_MS,
            grant_dwell_ms: DEFAULT_GRANT_DWELL_MS,
            actuator_pulse_ms: DEFAULT_ACTUATOR_PULSE_MS,
            token_read_timeout_ms: DEFAULT_TOKEN_READ_TIMEOUT_MS,
            denial_delay_ms: DEFAULT_DENIAL_DELAY_MS,
            reader_error_delay_ms: DEFAULT_READER_ERROR_DELAY_MS,
            grant_message_hold_ms: DEFAULT_GRANT_MESSAGE_HOLD_MS,
            camera_cooldown_ms: DEFAULT_CAMERA_COOLDOWN_MS,
            banner_hold_ms: DEFAULT_BANNER_HOLD_MS,
        }
    }
}

impl SessionTiming {
    pub fn inspection_dwell(&self) -> Duration {
        Duration::from_millis(self.inspection_dwell_ms)
    }

    pub fn grant_dwell(&self) -> Duration {
        Duration::from_millis(self.grant_dwell_ms)
    }

    pub fn actuator_pulse(&self) -> Duration {
        Duration::from_millis(self.actuator_pulse_ms)
    }

    pub fn token_read_timeout(&self) -> Duration {
        Duration::from_millis(self.token_read_timeout_ms)
    }

    pub fn denial_delay(&self) -> Duration {
        Duration::from_millis(self.denial_delay_ms)
    }

    pub fn reader_error_delay(&self) -> Duration {
        Duration::from_millis(self.reader_error_delay_ms)
    }

    pub fn grant_message_hold(&self) -> Duration {
        Duration::from_millis(self.grant_message_hold_ms)
    }

    pub fn camera_cooldown(&self) -> Duration {
        Duration::from_millis(self.camera_cooldown_ms)
    }

    pub fn banner_hold(&self) -> Duration {
        Duration::from_millis(self.banner_hold_ms)
    }
}

/// Face classifier parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of neighbours that vote.
    pub neighbors: usize,

    /// Side of the square face sample, in pixels.
    pub face_side: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_KNN_NEIGHBORS,
            face_side: DEFAULT_FACE_SIDE,
        }
    }
}

/// Remote lamp/fan control channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,

    #[serde(flatten)]
    pub server: RemoteServerConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server: RemoteServerConfig::default(),
        }
    }
}
