//! User-facing messages shown on the LCD and spoken by the speech driver.
//!
//! Display messages are pairs of lines. The LCD is 16 columns wide; longer
//! lines are truncated by the display driver, so a few messages lose their
//! last characters on real hardware.
//!
//! # Usage
//!
//! ```
//! use doorward_core::messages::{DisplayMessages, SpokenPhrases};
//!
//! let (line1, line2) = DisplayMessages::UNKNOWN_PERSON;
//! assert_eq!(line1, "Unknown Person");
//! assert_eq!(line2, "Access Denied");
//! assert_eq!(SpokenPhrases::granted("alice"), "Access granted, welcome alice");
//! ```

/// Two-line messages for the door display.
pub struct DisplayMessages;

impl DisplayMessages {
    /// Shown once at startup.
    pub const BANNER: (&'static str, &'static str) = ("Hi, welcome", "Door Lock Unlock");

    /// Shown while waiting for a face.
    pub const AWAITING_FACE: (&'static str, &'static str) = ("Put Face in Front", "of Camera");

    /// Shown when a face was classified and the inspection unlock starts.
    pub const FACE_MATCHED: (&'static str, &'static str) = ("Door is Open", "Welcome");

    /// Shown when the token is requested.
    pub const AWAITING_TOKEN: (&'static str, &'static str) = ("Open Door", "Put RFID Card");

    /// Token does not belong to the recognized person.
    pub const TOKEN_MISMATCH: (&'static str, &'static str) = ("Card doesn't match", "Try again");

    /// Recognized label has no enrollment record.
    pub const UNKNOWN_PERSON: (&'static str, &'static str) = ("Unknown Person", "Access Denied");

    /// Token reader failed or timed out.
    pub const READER_ERROR: (&'static str, &'static str) = ("RFID Error!", "");

    /// First line of the grant message; the second line is built by
    /// [`DisplayMessages::welcome`].
    pub const ACCESS_GRANTED: &'static str = "Access Granted";

    /// Second line of the grant message.
    pub fn welcome(name: &str) -> String {
        format!("Welcome {name}")
    }
}

/// Phrases for the speech driver.
pub struct SpokenPhrases;

impl SpokenPhrases {
    pub const FACE_MATCHED: &'static str = "Door is open, welcome";

    pub const AWAITING_TOKEN: &'static str = "Please show your RFID card";

    pub const TOKEN_MISMATCH: &'static str = "RFID does not match the recognized person";

    pub const UNKNOWN_PERSON: &'static str = "Access denied";

    pub const READER_ERROR: &'static str = "Card could not be read";

    pub fn granted(name: &str) -> String {
        format!("Access granted, welcome {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_non_empty() {
        let pairs = [
            DisplayMessages::BANNER,
            DisplayMessages::AWAITING_FACE,
            DisplayMessages::FACE_MATCHED,
            DisplayMessages::AWAITING_TOKEN,
            DisplayMessages::TOKEN_MISMATCH,
            DisplayMessages::UNKNOWN_PERSON,
            DisplayMessages::READER_ERROR,
        ];

        for (line1, _) in pairs {
            assert!(!line1.is_empty());
            assert!(line1.is_ascii());
        }
    }

    #[test]
    fn test_denial_messages_are_distinct() {
        assert_ne!(DisplayMessages::TOKEN_MISMATCH, DisplayMessages::UNKNOWN_PERSON);
        assert_ne!(SpokenPhrases::TOKEN_MISMATCH, SpokenPhrases::UNKNOWN_PERSON);
    }

    #[test]
    fn test_welcome_lines() {
        assert_eq!(DisplayMessages::welcome("bob"), "Welcome bob");
        assert_eq!(SpokenPhrases::granted("bob"), "Access granted, welcome bob");
    }
}
