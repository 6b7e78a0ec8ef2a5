//! Dense pixel grid shared between the loader and the channel builder

use ndarray::{Array3, ArrayView2, Axis};

use crate::{Error, Result};

/// Number of color channels in a [`PixelGrid`]
pub const RGB_CHANNELS: usize = 3;

/// Image samples laid out as `(height, width, channel)`.
///
/// Values are raw 8-bit intensities (0–255) widened to `f32`; they are not
/// normalized. The grid is row-major: row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    data: Array3<f32>,
}

impl PixelGrid {
    /// Wrap an existing `(height, width, channels)` array.
    ///
    /// The channel count is not checked here so that malformed grids can
    /// still reach [`PixelGrid::validate_rgb`] and be reported there.
    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Build a grid from interleaved RGB bytes, as produced by `RgbImage::into_raw`
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected = width * height * RGB_CHANNELS;
        if bytes.len() != expected {
            return Err(Error::InvalidImageShape(format!(
                "expected {} bytes for a {}x{} RGB image, got {}",
                expected,
                width,
                height,
                bytes.len()
            )));
        }
        let samples = bytes.iter().map(|&b| f32::from(b)).collect();
        let data = Array3::from_shape_vec((height, width, RGB_CHANNELS), samples)
            .map_err(|e| Error::InvalidImageShape(e.to_string()))?;
        Ok(Self { data })
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// `(height, width, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// One channel plane as a `(height, width)` view
    pub fn channel(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(2), index)
    }

    pub fn as_array(&self) -> &Array3<f32> {
        &self.data
    }

    /// Check the grid is a non-empty three-channel image
    pub fn validate_rgb(&self) -> Result<()> {
        let (height, width, channels) = self.dim();
        if channels != RGB_CHANNELS {
            return Err(Error::InvalidImageShape(format!(
                "expected {} channels, found {}",
                RGB_CHANNELS, channels
            )));
        }
        if height == 0 || width == 0 {
            return Err(Error::InvalidImageShape(format!(
                "image has zero area ({}x{})",
                width, height
            )));
        }
        Ok(())
    }
}
