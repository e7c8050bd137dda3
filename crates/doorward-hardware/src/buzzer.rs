//! Buzzer driven from a single output line.

use tokio::time::sleep;
use tracing::trace;

use crate::{
    Result,
    traits::{Buzzer, OutputPin},
    types::BuzzerPattern,
};

/// Plays beep patterns by toggling an [`OutputPin`].
#[derive(Debug)]
pub struct PinBuzzer<P> {
    pin: P,
}

impl<P: OutputPin> PinBuzzer<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Buzzer for PinBuzzer<P> {
    async fn sound(&mut self, pattern: BuzzerPattern) -> Result<()> {
        for beep in 0..pattern.beeps {
            trace!(beep, "buzzer on");
            if let Err(e) = self.pin.set(true).await {
                // Leave the line low even if the beep itself failed.
                let _ = self.pin.set(false).await;
                return Err(e);
            }
            sleep(pattern.on).await;
            self.pin.set(false).await?;
            sleep(pattern.off).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPin;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_grant_pattern_toggles_twice() {
        let (pin, probe) = MockPin::new("buzzer");
        let mut buzzer = PinBuzzer::new(pin);

        let start = tokio::time::Instant::now();
        buzzer.sound(BuzzerPattern::grant()).await.unwrap();

        assert_eq!(probe.history(), vec![true, false, true, false]);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pin_propagates() {
        let (pin, probe) = MockPin::new("buzzer");
        probe.set_failing(true);
        let mut buzzer = PinBuzzer::new(pin);

        assert!(buzzer.sound(BuzzerPattern::grant()).await.is_err());
        assert!(!probe.level());
    }
}
