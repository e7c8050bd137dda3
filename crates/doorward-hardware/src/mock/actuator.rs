//! Mock latch actuator.

use crate::{
    HardwareError, Result,
    mock::Recording,
    traits::LockActuator,
    types::{DeviceInfo, LockPosition},
};

/// Mock latch that records each commanded position.
///
/// Once released, further position commands fail.
#[derive(Debug)]
pub struct MockActuator {
    name: String,
    positions: Recording<LockPosition>,
    releases: Recording<()>,
}

impl MockActuator {
    pub fn new() -> (Self, MockActuatorProbe) {
        Self::with_name("Mock Servo")
    }

    pub fn with_name(name: impl Into<String>) -> (Self, MockActuatorProbe) {
        let name = name.into();
        let positions = Recording::new();
        let releases = Recording::new();

        let actuator = Self {
            name,
            positions: positions.clone(),
            releases: releases.clone(),
        };
        let probe = MockActuatorProbe {
            positions,
            releases,
        };

        (actuator, probe)
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new().0
    }
}

impl LockActuator for MockActuator {
    async fn set_position(&mut self, position: LockPosition) -> Result<()> {
        if !self.releases.is_empty() {
            return Err(HardwareError::released(self.name.clone()));
        }
        if self.positions.is_failing() {
            return Err(HardwareError::actuator(format!(
                "{} did not reach {position}",
                self.name
            )));
        }
        self.positions.push(position);
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.releases.push(());
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock PWM Servo")
    }
}

/// Read-side view of a [`MockActuator`].
#[derive(Debug, Clone)]
pub struct MockActuatorProbe {
    positions: Recording<LockPosition>,
    releases: Recording<()>,
}

impl MockActuatorProbe {
    /// Every commanded position, oldest first.
    pub fn positions(&self) -> Vec<LockPosition> {
        self.positions.snapshot()
    }

    /// Last non-neutral position, i.e. where the bolt was driven to.
    pub fn latched(&self) -> Option<LockPosition> {
        self.positions
            .snapshot()
            .into_iter()
            .rev()
            .find(|p| *p != LockPosition::Neutral)
    }

    /// How many times the actuator was released.
    pub fn release_count(&self) -> usize {
        self.releases.len()
    }

    /// Forget recorded positions.
    pub fn clear(&self) {
        self.positions.clear();
    }

    pub fn set_failing(&self, failing: bool) {
        self.positions.set_failing(failing);
    }
}
