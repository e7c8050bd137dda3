//! Core constants for the door controller.
//!
//! Timing values are the defaults used when no configuration overrides them.
//! They mirror the physical behaviour of the installed door: a servo latch
//! that is pulsed rather than held, a 16×2 character LCD and an RFID reader
//! that blocks until a tag is presented.
//!
//! # Usage
//!
//! ```
//! use doorward_core::constants::*;
//! use std::time::Duration;
//!
//! let dwell = Duration::from_millis(DEFAULT_INSPECTION_DWELL_MS);
//! assert_eq!(dwell, Duration::from_secs(10));
//! ```

// ============================================================================
// Session Timing
// ============================================================================

/// How long the door stays unlocked after a face match, before the token
/// is requested.
pub const DEFAULT_INSPECTION_DWELL_MS: u64 = 10_000;

/// How long the door stays unlocked after a granted session.
pub const DEFAULT_GRANT_DWELL_MS: u64 = 5_000;

/// How long the latch is driven to a position before being released to
/// neutral.
pub const DEFAULT_ACTUATOR_PULSE_MS: u64 = 1_000;

/// Maximum time the token reader blocks waiting for a tag.
pub const DEFAULT_TOKEN_READ_TIMEOUT_MS: u64 = 30_000;

/// Hold time for mismatch and unknown-identity denial messages.
pub const DEFAULT_DENIAL_DELAY_MS: u64 = 3_000;

/// Hold time for the reader error message.
pub const DEFAULT_READER_ERROR_DELAY_MS: u64 = 2_000;

/// Hold time for the access granted message.
pub const DEFAULT_GRANT_MESSAGE_HOLD_MS: u64 = 3_000;

/// Time the camera stays released after a granted session.
pub const DEFAULT_CAMERA_COOLDOWN_MS: u64 = 5_000;

/// Hold time for the startup banner.
pub const DEFAULT_BANNER_HOLD_MS: u64 = 3_000;

// ============================================================================
// Buzzer Pattern
// ============================================================================

/// Number of beeps sounded on a granted session.
pub const GRANT_BEEP_COUNT: u8 = 2;

/// Duration of each grant beep.
pub const GRANT_BEEP_ON_MS: u64 = 1_000;

/// Silence after each grant beep.
pub const GRANT_BEEP_OFF_MS: u64 = 500;

// ============================================================================
// Classification
// ============================================================================

/// Number of neighbours consulted by the face classifier.
pub const DEFAULT_KNN_NEIGHBORS: usize = 5;

/// Side length (pixels) of the square a face crop is resized to.
pub const DEFAULT_FACE_SIDE: usize = 50;

// ============================================================================
// Display
// ============================================================================

/// Number of lines on the character LCD.
pub const LCD_LINES: usize = 2;

/// Number of characters per LCD line.
pub const LCD_WIDTH: usize = 16;

// ============================================================================
// Servo Duty Cycles
// ============================================================================

/// PWM frequency of the latch servo in Hz.
pub const SERVO_PWM_HZ: u32 = 50;

/// Duty cycle (percent) that drives the latch to the unlocked angle (180°).
pub const SERVO_UNLOCK_DUTY: f32 = 12.0;

/// Duty cycle (percent) that drives the latch to the locked angle (0°).
pub const SERVO_LOCK_DUTY: f32 = 2.5;

/// Duty cycle that releases the servo.
pub const SERVO_NEUTRAL_DUTY: f32 = 0.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_dwell_shorter_than_inspection() {
        assert!(DEFAULT_GRANT_DWELL_MS < DEFAULT_INSPECTION_DWELL_MS);
    }

    #[test]
    fn test_servo_duty_ordering() {
        assert!(SERVO_NEUTRAL_DUTY < SERVO_LOCK_DUTY);
        assert!(SERVO_LOCK_DUTY < SERVO_UNLOCK_DUTY);
    }
}
