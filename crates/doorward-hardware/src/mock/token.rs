//! Mock token reader implementation for testing and development.
//!
//! This module provides a simulated RFID reader that can be controlled
//! programmatically for testing without requiring physical hardware.

use std::time::Duration;

use doorward_core::TokenId;
use tokio::sync::mpsc;

use crate::{
    HardwareError, Result,
    traits::TokenReader,
    types::{DeviceInfo, TokenRead},
};

/// Internal event type for the mock token reader.
#[derive(Debug, Clone)]
enum TokenEvent {
    Presented(TokenRead),
    Failure(String),
}

/// Mock token reader for testing and development.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use doorward_core::TokenId;
/// use doorward_hardware::mock::MockTokenReader;
/// use doorward_hardware::traits::TokenReader;
///
/// #[tokio::main]
/// async fn main() -> doorward_hardware::Result<()> {
///     let (mut reader, handle) = MockTokenReader::new();
///
///     handle.present_token(TokenId::from_numeric(584190234871)).await?;
///
///     let read = reader.read_token(Duration::from_secs(1)).await?;
///     assert_eq!(read.token_id.as_str(), "584190234871");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTokenReader {
    /// Channel receiver for token events
    event_rx: mpsc::Receiver<TokenEvent>,

    /// Device name
    name: String,
}

impl MockTokenReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockTokenReaderHandle) {
        Self::with_name("Mock RFID Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockTokenReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockTokenReaderHandle { event_tx, name };

        (reader, handle)
    }

    /// Number of queued events not yet read.
    pub fn pending(&self) -> usize {
        self.event_rx.len()
    }
}

impl Default for MockTokenReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl TokenReader for MockTokenReader {
    async fn read_token(&mut self, timeout: Duration) -> Result<TokenRead> {
        let event = tokio::time::timeout(timeout, self.event_rx.recv())
            .await
            .map_err(|_| HardwareError::timeout(timeout.as_millis() as u64))?
            .ok_or_else(|| HardwareError::disconnected("RFID event channel closed"))?;

        match event {
            TokenEvent::Presented(read) => Ok(read),
            TokenEvent::Failure(message) => Err(HardwareError::token_read(message)),
        }
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock MFRC522").with_address("SPI0.0")
    }
}

/// Handle for controlling a mock token reader.
#[derive(Debug, Clone)]
pub struct MockTokenReaderHandle {
    /// Channel sender for token events
    event_tx: mpsc::Sender<TokenEvent>,

    /// Device name
    name: String,
}

impl MockTokenReaderHandle {
    /// Present a token with an empty payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_token(&self, token_id: TokenId) -> Result<()> {
        self.present_with_payload(token_id, "").await
    }

    /// Present a token carrying `payload` text.
    pub async fn present_with_payload(
        &self,
        token_id: TokenId,
        payload: impl Into<String>,
    ) -> Result<()> {
        self.send(TokenEvent::Presented(TokenRead::new(token_id, payload)))
            .await
    }

    /// Make the next read fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) -> Result<()> {
        self.send(TokenEvent::Failure(message.into())).await
    }

    async fn send(&self, event: TokenEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("RFID event channel closed"))
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_present_and_read() {
        let (mut reader, handle) = MockTokenReader::new();

        tokio::spawn(async move {
            handle
                .present_with_payload(TokenId::new("04ABCDEF").unwrap(), "alice")
                .await
                .unwrap();
        });

        let read = reader.read_token(Duration::from_secs(5)).await.unwrap();
        assert_eq!(read.token_id.as_str(), "04ABCDEF");
        assert_eq!(read.payload, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_times_out() {
        let (mut reader, _handle) = MockTokenReader::new();

        let result = reader.read_token(Duration::from_secs(30)).await;
        assert!(matches!(result, Err(HardwareError::Timeout { duration_ms: 30000 })));
    }

    #[tokio::test]
    async fn test_injected_read_error() {
        let (mut reader, handle) = MockTokenReader::new();
        handle.fail_next("collision").await.unwrap();
        assert_eq!(reader.pending(), 1);

        let result = reader.read_token(Duration::from_secs(1)).await;
        assert!(matches!(result, Err(HardwareError::TokenReadError { .. })));
    }

    #[tokio::test]
    async fn test_dropped_handle_is_disconnect() {
        let (mut reader, handle) = MockTokenReader::with_name("reader".to_string());
        assert_eq!(handle.name(), "reader");
        drop(handle);

        let result = reader.read_token(Duration::from_secs(1)).await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
