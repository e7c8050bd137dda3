//! Face crop normalization.

use doorward_core::FaceSample;
use doorward_core::constants::DEFAULT_FACE_SIDE;
use doorward_hardware::Frame;
use tracing::trace;

use crate::Result;

/// Resizes a face crop to a square of `side` pixels and flattens it.
///
/// Channels are kept as captured, so a color crop yields
/// `side * side * 3` values and a grayscale crop `side * side`. Resampling
/// is nearest-neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceNormalizer {
    side: usize,
}

impl FaceNormalizer {
    pub fn new(side: usize) -> Self {
        Self { side: side.max(1) }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Vector length produced for a crop with `channels` channels.
    pub fn dimension(&self, channels: u8) -> usize {
        self.side * self.side * channels as usize
    }

    /// Normalize `crop` into a face sample.
    ///
    /// # Errors
    /// Returns an error if the crop has no pixels.
    pub fn normalize(&self, crop: &Frame) -> Result<FaceSample> {
        let (width, height) = (crop.width() as usize, crop.height() as usize);
        let channels = crop.channels() as usize;
        let data = crop.data();

        let mut values = Vec::with_capacity(self.side * self.side * channels);
        if width > 0 && height > 0 {
            for y in 0..self.side {
                let src_y = y * height / self.side;
                for x in 0..self.side {
                    let src_x = x * width / self.side;
                    let offset = (src_y * width + src_x) * channels;
                    values.extend(data[offset..offset + channels].iter().map(|&b| f32::from(b)));
                }
            }
        }

        trace!(
            width,
            height,
            channels,
            side = self.side,
            "face crop normalized"
        );
        Ok(FaceSample::new(values)?)
    }
}

impl Default for FaceNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_FACE_SIDE)
    }
}
