//! Remote-safe access to the door outputs.
//!
//! [`PeripheralFacade`] owns the latch actuator and the lamp and
//! ventilation lines. It is shared (behind an `Arc`) by the access session
//! and the remote-control listener, which run concurrently. Each output has
//! its own async mutex, so a one-second latch pulse never delays a lamp
//! toggle while writes to the same output are serialized.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use doorward_hardware::PeripheralFacade;
//! use doorward_hardware::mock::{MockActuator, MockPin};
//!
//! #[tokio::main]
//! async fn main() -> doorward_hardware::Result<()> {
//!     let (servo, _servo_probe) = MockActuator::new();
//!     let (lamp, lamp_probe) = MockPin::new("lamp");
//!     let (fan, _fan_probe) = MockPin::new("fan");
//!
//!     let facade = Arc::new(PeripheralFacade::new(servo, lamp, fan));
//!     facade.set_lamp(true).await?;
//!
//!     assert!(facade.outputs().lamp);
//!     assert!(lamp_probe.level());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use doorward_core::constants::DEFAULT_ACTUATOR_PULSE_MS;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    HardwareError, Result,
    traits::{LockActuator, OutputPin},
    types::LockPosition,
};

/// The outputs the facade controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    Latch,
    Lamp,
    Ventilation,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Output::Latch => "latch",
            Output::Lamp => "lamp",
            Output::Ventilation => "ventilation",
        };
        write!(f, "{s}")
    }
}

/// Last value successfully applied to each output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSnapshot {
    /// Where the latch was last driven (`Locked` or `Unlocked`).
    pub latch: LockPosition,
    pub lamp: bool,
    pub ventilation: bool,
}

impl Default for OutputSnapshot {
    fn default() -> Self {
        Self {
            latch: LockPosition::Locked,
            lamp: false,
            ventilation: false,
        }
    }
}

/// Shared owner of the latch, lamp, and ventilation outputs.
pub struct PeripheralFacade<A, P> {
    latch: Mutex<A>,
    lamp: Mutex<P>,
    ventilation: Mutex<P>,
    pulse: Duration,
    snapshot: StdMutex<OutputSnapshot>,
    released: AtomicBool,
}

impl<A, P> fmt::Debug for PeripheralFacade<A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeripheralFacade")
            .field("pulse", &self.pulse)
            .field("outputs", &*self.snapshot())
            .finish_non_exhaustive()
    }
}

impl<A, P> PeripheralFacade<A, P> {
    fn snapshot(&self) -> MutexGuard<'_, OutputSnapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current output values.
    pub fn outputs(&self) -> OutputSnapshot {
        *self.snapshot()
    }

    /// How long the latch is driven before the signal is dropped.
    pub fn pulse(&self) -> Duration {
        self.pulse
    }
}

impl<A: LockActuator, P: OutputPin> PeripheralFacade<A, P> {
    /// Create a facade with the default one-second latch pulse.
    ///
    /// The latch is assumed locked and both lines off until commanded.
    pub fn new(actuator: A, lamp: P, ventilation: P) -> Self {
        Self {
            latch: Mutex::new(actuator),
            lamp: Mutex::new(lamp),
            ventilation: Mutex::new(ventilation),
            pulse: Duration::from_millis(DEFAULT_ACTUATOR_PULSE_MS),
            snapshot: StdMutex::new(OutputSnapshot::default()),
            released: AtomicBool::new(false),
        }
    }

    /// Override the latch pulse duration.
    pub fn with_pulse(mut self, pulse: Duration) -> Self {
        self.pulse = pulse;
        self
    }

    /// Pulse the latch open.
    pub async fn unlock(&self) -> Result<()> {
        self.pulse_latch(LockPosition::Unlocked).await
    }

    /// Pulse the latch closed.
    pub async fn lock(&self) -> Result<()> {
        self.pulse_latch(LockPosition::Locked).await
    }

    async fn pulse_latch(&self, position: LockPosition) -> Result<()> {
        let mut actuator = self.latch.lock().await;
        self.ensure_open(Output::Latch)?;

        debug!(%position, duty = position.duty_cycle(), "driving latch");
        actuator.set_position(position).await?;
        self.snapshot().latch = position;

        sleep(self.pulse).await;
        actuator.set_position(LockPosition::Neutral).await?;

        info!(%position, "latch pulse complete");
        Ok(())
    }

    /// Switch the lamp relay.
    pub async fn set_lamp(&self, on: bool) -> Result<()> {
        self.set_line(Output::Lamp, &self.lamp, on).await
    }

    /// Switch the ventilation relay.
    pub async fn set_ventilation(&self, on: bool) -> Result<()> {
        self.set_line(Output::Ventilation, &self.ventilation, on)
            .await
    }

    async fn set_line(&self, output: Output, line: &Mutex<P>, on: bool) -> Result<()> {
        let mut pin = line.lock().await;
        self.ensure_open(output)?;
        pin.set(on).await?;

        {
            let mut snapshot = self.snapshot();
            match output {
                Output::Lamp => snapshot.lamp = on,
                Output::Ventilation => snapshot.ventilation = on,
                Output::Latch => {}
            }
        }

        info!(%output, on, "output set");
        Ok(())
    }

    fn ensure_open(&self, output: Output) -> Result<()> {
        if self.released.load(Ordering::Acquire) {
            return Err(HardwareError::released(output.to_string()));
        }
        Ok(())
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Drive every output to its safe value: latch locked, lamp and
    /// ventilation off.
    ///
    /// All three are attempted even if one fails; the first error is
    /// returned.
    pub async fn safe_state(&self) -> Result<()> {
        let results = [
            (Output::Latch, self.lock().await),
            (Output::Lamp, self.set_lamp(false).await),
            (Output::Ventilation, self.set_ventilation(false).await),
        ];

        let mut first_error = None;
        for (output, result) in results {
            if let Err(e) = result {
                warn!(%output, error = %e, "failed to reach safe state");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close the facade and release the latch actuator.
    ///
    /// Every later command fails with `HardwareError::Released`. A lamp or
    /// ventilation write that raced past [`safe_state`](Self::safe_state)
    /// is switched back off here.
    pub async fn release(&self) -> Result<()> {
        let mut actuator = self.latch.lock().await;
        self.released.store(true, Ordering::Release);

        for (output, line) in [
            (Output::Lamp, &self.lamp),
            (Output::Ventilation, &self.ventilation),
        ] {
            let mut pin = line.lock().await;
            let on = match output {
                Output::Lamp => self.outputs().lamp,
                _ => self.outputs().ventilation,
            };
            if !on {
                continue;
            }
            match pin.set(false).await {
                Ok(()) => {
                    let mut snapshot = self.snapshot();
                    match output {
                        Output::Lamp => snapshot.lamp = false,
                        _ => snapshot.ventilation = false,
                    }
                }
                Err(e) => warn!(%output, error = %e, "output left on at release"),
            }
        }

        actuator.release().await?;
        info!("latch actuator released");
        Ok(())
    }
}
