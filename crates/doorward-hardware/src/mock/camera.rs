//! Mock camera implementation for testing and development.
//!
//! Frames are pushed through a [`MockCameraHandle`]; the camera delivers
//! them in order and blocks while none are queued.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::{HardwareError, Result, traits::Camera, types::DeviceInfo, types::Frame};

/// Internal event type for the mock camera.
#[derive(Debug, Clone)]
enum CameraEvent {
    Frame(Frame),
    Failure(String),
}

#[derive(Debug, Default)]
struct CameraStats {
    open: bool,
    frames_delivered: u64,
    releases: u32,
    reopens: u32,
}

/// Mock camera for testing and development.
///
/// # Examples
///
/// ```
/// use doorward_hardware::mock::MockCamera;
/// use doorward_hardware::traits::Camera;
/// use doorward_hardware::types::Frame;
///
/// #[tokio::main]
/// async fn main() -> doorward_hardware::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///
///     handle.push_frame(Frame::filled(4, 4, 128)).await?;
///
///     let frame = camera.next_frame().await?;
///     assert_eq!(frame.width(), 4);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    /// Channel receiver for frame events
    event_rx: mpsc::Receiver<CameraEvent>,

    /// Device name
    name: String,

    stats: Arc<Mutex<CameraStats>>,
}

impl MockCamera {
    /// Create a new mock camera with the default name.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_name("Mock Camera".to_string())
    }

    /// Create a new mock camera with a custom name.
    pub fn with_name(name: String) -> (Self, MockCameraHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let stats = Arc::new(Mutex::new(CameraStats {
            open: true,
            ..CameraStats::default()
        }));

        let camera = Self {
            event_rx,
            name: name.clone(),
            stats: Arc::clone(&stats),
        };

        let handle = MockCameraHandle {
            event_tx,
            name,
            stats,
        };

        (camera, handle)
    }

    fn stats(&self) -> MutexGuard<'_, CameraStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new().0
    }
}

impl Camera for MockCamera {
    async fn next_frame(&mut self) -> Result<Frame> {
        if !self.stats().open {
            return Err(HardwareError::released(self.name.clone()));
        }

        let event = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Camera frame channel closed"))?;

        match event {
            CameraEvent::Frame(frame) => {
                self.stats().frames_delivered += 1;
                Ok(frame)
            }
            CameraEvent::Failure(message) => Err(HardwareError::frame_capture(message)),
        }
    }

    async fn release(&mut self) -> Result<()> {
        let mut stats = self.stats();
        stats.open = false;
        stats.releases += 1;
        Ok(())
    }

    async fn reopen(&mut self) -> Result<()> {
        let mut stats = self.stats();
        stats.open = true;
        stats.reopens += 1;
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock Camera").with_address("/dev/video0")
    }
}

/// Handle for feeding a mock camera and observing its lifecycle.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    /// Channel sender for frame events
    event_tx: mpsc::Sender<CameraEvent>,

    /// Device name
    name: String,

    stats: Arc<Mutex<CameraStats>>,
}

impl MockCameraHandle {
    /// Queue a frame for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn push_frame(&self, frame: Frame) -> Result<()> {
        self.send(CameraEvent::Frame(frame)).await
    }

    /// Make the next capture fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) -> Result<()> {
        self.send(CameraEvent::Failure(message.into())).await
    }

    async fn send(&self, event: CameraEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("Camera frame channel closed"))
    }

    fn stats(&self) -> MutexGuard<'_, CameraStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the camera currently holds the device.
    pub fn is_open(&self) -> bool {
        self.stats().open
    }

    pub fn frames_delivered(&self) -> u64 {
        self.stats().frames_delivered
    }

    pub fn release_count(&self) -> u32 {
        self.stats().releases
    }

    pub fn reopen_count(&self) -> u32 {
        self.stats().reopens
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
