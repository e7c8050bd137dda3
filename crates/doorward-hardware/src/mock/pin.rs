//! Mock digital output line.

use crate::{HardwareError, Result, mock::Recording, traits::OutputPin, types::DeviceInfo};

/// Mock output pin that records every level written to it.
///
/// # Examples
///
/// ```
/// use doorward_hardware::mock::MockPin;
/// use doorward_hardware::traits::OutputPin;
///
/// #[tokio::main]
/// async fn main() -> doorward_hardware::Result<()> {
///     let (mut lamp, probe) = MockPin::new("lamp");
///
///     lamp.set(true).await?;
///     lamp.set(false).await?;
///
///     assert_eq!(probe.history(), vec![true, false]);
///     assert!(!probe.level());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPin {
    name: String,
    levels: Recording<bool>,
}

impl MockPin {
    /// Create a new mock pin and its probe.
    pub fn new(name: impl Into<String>) -> (Self, MockPinProbe) {
        let name = name.into();
        let levels = Recording::new();

        let pin = Self {
            name: name.clone(),
            levels: levels.clone(),
        };
        let probe = MockPinProbe { name, levels };

        (pin, probe)
    }
}

impl OutputPin for MockPin {
    async fn set(&mut self, on: bool) -> Result<()> {
        if self.levels.is_failing() {
            return Err(HardwareError::communication(format!(
                "{}: write failed",
                self.name
            )));
        }
        self.levels.push(on);
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock GPIO")
    }
}

/// Read-side view of a [`MockPin`].
#[derive(Debug, Clone)]
pub struct MockPinProbe {
    name: String,
    levels: Recording<bool>,
}

impl MockPinProbe {
    /// Current level; a pin never written is low.
    pub fn level(&self) -> bool {
        self.levels.last().unwrap_or(false)
    }

    /// Every level written, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.levels.snapshot()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.levels.len()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.levels.set_failing(failing);
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
