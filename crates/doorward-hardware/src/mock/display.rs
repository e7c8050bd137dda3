//! Virtual character LCD.
//!
//! Models the 16x2 HD44780-style module mounted by the door: both lines are
//! left-aligned and padded to the panel width, longer text is truncated, and
//! characters the controller ROM cannot render are replaced.
//!
//! # Character Encoding - ASCII Only
//!
//! The panel only renders printable ASCII (0x20-0x7E). Control characters are
//! dropped and any other character is shown as `?`, the same way the real
//! module shows a blank glyph block instead of failing.

use doorward_core::constants::{LCD_LINES, LCD_WIDTH};

use crate::{HardwareError, Result, mock::Recording, traits::TextDisplay};

/// Mock two-line display.
///
/// # Examples
///
/// ```
/// use doorward_hardware::mock::MockDisplay;
/// use doorward_hardware::traits::TextDisplay;
///
/// #[tokio::main]
/// async fn main() -> doorward_hardware::Result<()> {
///     let (mut lcd, probe) = MockDisplay::new();
///
///     lcd.show("Access Granted", "Welcome alice").await?;
///
///     assert_eq!(probe.lines(), ("Access Granted".to_string(), "Welcome alice".to_string()));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    columns: usize,
    frames: Recording<[String; LCD_LINES]>,
}

impl MockDisplay {
    /// A 16-column display.
    pub fn new() -> (Self, MockDisplayProbe) {
        Self::with_columns(LCD_WIDTH)
    }

    pub fn with_columns(columns: usize) -> (Self, MockDisplayProbe) {
        let frames = Recording::new();
        let display = Self {
            columns,
            frames: frames.clone(),
        };
        (display, MockDisplayProbe { frames })
    }
}

impl TextDisplay for MockDisplay {
    async fn show(&mut self, line1: &str, line2: &str) -> Result<()> {
        if self.frames.is_failing() {
            return Err(HardwareError::communication("LCD I2C write failed"));
        }
        self.frames.push([
            fit_line(line1, self.columns),
            fit_line(line2, self.columns),
        ]);
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        if self.frames.is_failing() {
            return Err(HardwareError::communication("LCD I2C write failed"));
        }
        let blank = " ".repeat(self.columns);
        self.frames.push([blank.clone(), blank]);
        Ok(())
    }
}

/// Read-side view of a [`MockDisplay`].
#[derive(Debug, Clone)]
pub struct MockDisplayProbe {
    frames: Recording<[String; LCD_LINES]>,
}

impl MockDisplayProbe {
    /// Currently shown lines, trailing padding removed.
    pub fn lines(&self) -> (String, String) {
        match self.frames.last() {
            Some([l1, l2]) => (l1.trim_end().to_string(), l2.trim_end().to_string()),
            None => (String::new(), String::new()),
        }
    }

    /// Raw padded buffer of the current screen.
    pub fn raw(&self) -> Option<[String; LCD_LINES]> {
        self.frames.last()
    }

    /// Every screen shown, trailing padding removed, oldest first.
    pub fn history(&self) -> Vec<(String, String)> {
        self.frames
            .snapshot()
            .into_iter()
            .map(|[l1, l2]| (l1.trim_end().to_string(), l2.trim_end().to_string()))
            .collect()
    }

    /// True if `line1` has ever been shown on the first line.
    pub fn has_shown(&self, line1: &str) -> bool {
        self.history().iter().any(|(l1, _)| l1 == line1)
    }

    pub fn set_failing(&self, failing: bool) {
        self.frames.set_failing(failing);
    }
}

/// Render `text` for a `width`-column line: sanitize, truncate, pad.
pub fn fit_line(text: &str, width: usize) -> String {
    let mut line: String = text
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_ascii() { c } else { '?' })
        .take(width)
        .collect();

    let len = line.chars().count();
    line.push_str(&" ".repeat(width - len));
    line
}
