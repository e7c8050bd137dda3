//! Mock text-to-speech output.

use crate::{HardwareError, Result, mock::Recording, traits::Speaker};

/// Records every phrase instead of speaking it.
#[derive(Debug)]
pub struct MockSpeaker {
    phrases: Recording<String>,
}

impl MockSpeaker {
    pub fn new() -> (Self, MockSpeakerProbe) {
        let phrases = Recording::new();
        (
            Self {
                phrases: phrases.clone(),
            },
            MockSpeakerProbe { phrases },
        )
    }
}

impl Speaker for MockSpeaker {
    async fn speak(&mut self, phrase: &str) -> Result<()> {
        if self.phrases.is_failing() {
            return Err(HardwareError::unsupported("speech engine unavailable"));
        }
        self.phrases.push(phrase.to_string());
        Ok(())
    }
}

/// Read-side view of a [`MockSpeaker`].
#[derive(Debug, Clone)]
pub struct MockSpeakerProbe {
    phrases: Recording<String>,
}

impl MockSpeakerProbe {
    pub fn phrases(&self) -> Vec<String> {
        self.phrases.snapshot()
    }

    pub fn last(&self) -> Option<String> {
        self.phrases.last()
    }

    pub fn set_failing(&self, failing: bool) {
        self.phrases.set_failing(failing);
    }
}
