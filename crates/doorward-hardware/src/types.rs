//! Common types shared across peripheral implementations.
//!
//! This module defines the data that flows between the controller and its
//! collaborators: captured frames and face bounding boxes, token reads,
//! latch positions, and buzzer patterns.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use doorward_core::TokenId;
use doorward_core::constants::{
    GRANT_BEEP_COUNT, GRANT_BEEP_OFF_MS, GRANT_BEEP_ON_MS, SERVO_LOCK_DUTY, SERVO_NEUTRAL_DUTY,
    SERVO_UNLOCK_DUTY,
};
use serde::{Deserialize, Serialize};

use crate::{HardwareError, Result};

/// Generic device information.
///
/// Contains metadata about a peripheral such as name, model, and the
/// GPIO line or bus address it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "MFRC522", "MockCamera").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional attachment point (GPIO pin, SPI bus, video device).
    pub address: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            address: None,
        }
    }

    /// Set the attachment point.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Rectangle around a detected face, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A captured camera frame.
///
/// Pixels are stored row-major with interleaved channels: one byte per
/// pixel for grayscale frames, three (red, green, blue) for color frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// Create a frame from raw pixel data.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidData` if `channels` is not 1 or 3, or if
    /// `data` does not hold exactly `width * height * channels` bytes.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if channels != 1 && channels != 3 {
            return Err(HardwareError::invalid_data(format!(
                "Unsupported channel count: {channels}"
            )));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(HardwareError::invalid_data(format!(
                "Frame of {width}x{height}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
            captured_at: Utc::now(),
        })
    }

    /// Grayscale frame from raw luminance bytes.
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, 1, data)
    }

    /// Grayscale frame with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            channels: 1,
            data: vec![value; width as usize * height as usize],
            captured_at: Utc::now(),
        }
    }

    /// All-black grayscale frame; detectors find no face in it.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// True if every byte is zero.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Bounding box covering the whole frame.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(0, 0, self.width, self.height)
    }

    /// Convert to a single-channel luminance frame.
    pub fn to_gray(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }

        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let luma =
                    0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]);
                luma.round().clamp(0.0, 255.0) as u8
            })
            .collect();

        Frame {
            width: self.width,
            height: self.height,
            channels: 1,
            data,
            captured_at: self.captured_at,
        }
    }

    /// Copy out the region under `bbox`, clipped to the frame.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidData` if the clipped region is empty.
    pub fn crop(&self, bbox: &BoundingBox) -> Result<Frame> {
        let x0 = bbox.x.min(self.width);
        let y0 = bbox.y.min(self.height);
        let x1 = bbox.x.saturating_add(bbox.width).min(self.width);
        let y1 = bbox.y.saturating_add(bbox.height).min(self.height);

        if x1 <= x0 || y1 <= y0 {
            return Err(HardwareError::invalid_data(format!(
                "Bounding box {bbox:?} lies outside {}x{} frame",
                self.width, self.height
            )));
        }

        let channels = self.channels as usize;
        let row_len = self.width as usize * channels;
        let mut data = Vec::with_capacity((x1 - x0) as usize * (y1 - y0) as usize * channels);
        for y in y0..y1 {
            let start = y as usize * row_len + x0 as usize * channels;
            let end = y as usize * row_len + x1 as usize * channels;
            data.extend_from_slice(&self.data[start..end]);
        }

        Ok(Frame {
            width: x1 - x0,
            height: y1 - y0,
            channels: self.channels,
            data,
            captured_at: self.captured_at,
        })
    }
}

/// A token presented to the reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRead {
    /// Identifier burned into the token.
    pub token_id: TokenId,

    /// Free-form text stored on the token, possibly empty.
    pub payload: String,

    /// When the reader produced the value.
    pub read_at: DateTime<Utc>,
}

impl TokenRead {
    pub fn new(token_id: TokenId, payload: impl Into<String>) -> Self {
        Self {
            token_id,
            payload: payload.into(),
            read_at: Utc::now(),
        }
    }
}

/// Commanded position of the latch actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPosition {
    /// Bolt engaged.
    Locked,
    /// Bolt retracted.
    Unlocked,
    /// No drive signal; the actuator holds its last position.
    Neutral,
}

impl LockPosition {
    /// PWM duty cycle (percent) for a 50 Hz hobby servo.
    pub fn duty_cycle(self) -> f32 {
        match self {
            LockPosition::Locked => SERVO_LOCK_DUTY,
            LockPosition::Unlocked => SERVO_UNLOCK_DUTY,
            LockPosition::Neutral => SERVO_NEUTRAL_DUTY,
        }
    }
}

impl fmt::Display for LockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockPosition::Locked => "locked",
            LockPosition::Unlocked => "unlocked",
            LockPosition::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}

/// On/off timing for the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerPattern {
    pub beeps: u32,
    pub on: Duration,
    pub off: Duration,
}

impl BuzzerPattern {
    pub fn new(beeps: u32, on: Duration, off: Duration) -> Self {
        Self { beeps, on, off }
    }

    /// Two one-second beeps separated by half a second.
    pub fn grant() -> Self {
        Self::new(
            u32::from(GRANT_BEEP_COUNT),
            Duration::from_millis(GRANT_BEEP_ON_MS),
            Duration::from_millis(GRANT_BEEP_OFF_MS),
        )
    }

    /// Total time the pattern takes to play.
    pub fn total_duration(&self) -> Duration {
        (self.on + self.off) * self.beeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("SG90", "Servo").with_address("GPIO26");

        assert_eq!(info.name, "SG90");
        assert_eq!(info.model, "Servo");
        assert_eq!(info.address, Some("GPIO26".to_string()));
    }

    #[test]
    fn test_frame_rejects_wrong_length() {
        assert!(Frame::gray(4, 4, vec![0; 15]).is_err());
        assert!(Frame::new(2, 2, 2, vec![0; 8]).is_err());
        assert!(Frame::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_blank_frame() {
        assert!(Frame::blank(8, 8).is_blank());
        assert!(!Frame::filled(8, 8, 1).is_blank());
    }

    #[test]
    fn test_crop_inside() {
        let data: Vec<u8> = (0..16).collect();
        let frame = Frame::gray(4, 4, data).unwrap();

        let crop = frame.crop(&BoundingBox::new(1, 1, 2, 2)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.data(), &[5, 6, 9, 10]);
    }

    #[test]
    fn test_crop_is_clipped_to_frame() {
        let frame = Frame::filled(4, 4, 7);
        let crop = frame.crop(&BoundingBox::new(2, 2, 10, 10)).unwrap();
        assert_eq!((crop.width(), crop.height()), (2, 2));
    }

    #[test]
    fn test_crop_outside_fails() {
        let frame = Frame::filled(4, 4, 7);
        assert!(frame.crop(&BoundingBox::new(4, 0, 2, 2)).is_err());
    }

    #[test]
    fn test_to_gray() {
        let frame = Frame::new(2, 1, 3, vec![255, 255, 255, 0, 0, 0]).unwrap();
        let gray = frame.to_gray();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.data(), &[255, 0]);
    }

    #[test]
    fn test_lock_position_duty_cycle() {
        assert_eq!(LockPosition::Unlocked.duty_cycle(), 12.0);
        assert_eq!(LockPosition::Locked.duty_cycle(), 2.5);
        assert_eq!(LockPosition::Neutral.duty_cycle(), 0.0);
        assert_eq!(LockPosition::Unlocked.to_string(), "unlocked");
    }

    #[test]
    fn test_lock_position_serialization() {
        let json = serde_json::to_string(&LockPosition::Locked).unwrap();
        assert_eq!(json, "\"locked\"");
    }

    #[test]
    fn test_grant_pattern() {
        let pattern = BuzzerPattern::grant();
        assert_eq!(pattern.beeps, 2);
        assert_eq!(pattern.total_duration(), Duration::from_secs(3));
    }
}
