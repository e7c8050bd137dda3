//! User feedback: display text, speech and the buzzer.
//!
//! Feedback failures never affect the latch or a session outcome; they are
//! logged and dropped.

use doorward_hardware::{Buzzer, BuzzerPattern, Speaker, TextDisplay};
use tracing::{debug, warn};

pub struct Feedback<D, B, S> {
    display: D,
    buzzer: B,
    speaker: S,
}

impl<D: TextDisplay, B: Buzzer, S: Speaker> Feedback<D, B, S> {
    pub fn new(display: D, buzzer: B, speaker: S) -> Self {
        Self {
            display,
            buzzer,
            speaker,
        }
    }

    /// Show a two-line message.
    pub async fn show(&mut self, (line1, line2): (&str, &str)) {
        debug!(line1, line2, "display");
        if let Err(e) = self.display.show(line1, line2).await {
            warn!(error = %e, line1, "display write failed");
        }
    }

    pub async fn say(&mut self, phrase: &str) {
        if let Err(e) = self.speaker.speak(phrase).await {
            warn!(error = %e, phrase, "speech failed");
        }
    }

    pub async fn beep(&mut self, pattern: BuzzerPattern) {
        if let Err(e) = self.buzzer.sound(pattern).await {
            warn!(error = %e, beeps = pattern.beeps, "buzzer failed");
        }
    }

    pub async fn clear(&mut self) {
        if let Err(e) = self.display.clear().await {
            warn!(error = %e, "display clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorward_hardware::PinBuzzer;
    use doorward_hardware::mock::{MockDisplay, MockPin, MockSpeaker};

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_swallowed() {
        let (display, display_probe) = MockDisplay::new();
        let (pin, pin_probe) = MockPin::new("buzzer");
        let (speaker, speaker_probe) = MockSpeaker::new();
        let mut feedback = Feedback::new(display, PinBuzzer::new(pin), speaker);

        display_probe.set_failing(true);
        pin_probe.set_failing(true);
        speaker_probe.set_failing(true);

        feedback.show(("Access Granted", "Welcome alice")).await;
        feedback.say("hello").await;
        feedback.beep(BuzzerPattern::grant()).await;
        feedback.clear().await;

        assert!(display_probe.history().is_empty());
        assert!(speaker_probe.phrases().is_empty());
    }

    #[tokio::test]
    async fn test_show_and_say() {
        let (display, display_probe) = MockDisplay::new();
        let (pin, _pin_probe) = MockPin::new("buzzer");
        let (speaker, speaker_probe) = MockSpeaker::new();
        let mut feedback = Feedback::new(display, PinBuzzer::new(pin), speaker);

        feedback.show(("Open Door", "Put RFID Card")).await;
        feedback.say("Please show your RFID card").await;

        assert_eq!(
            display_probe.lines(),
            ("Open Door".to_string(), "Put RFID Card".to_string())
        );
        assert_eq!(speaker_probe.last().as_deref(), Some("Please show your RFID card"));
    }
}
