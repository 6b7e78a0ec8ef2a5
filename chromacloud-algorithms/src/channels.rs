//! Coordinate and intensity grids
//!
//! Converts a [`PixelGrid`] into the per-pixel arrays a point cloud is built
//! from: integer X/Y coordinate grids plus one normalized intensity grid per
//! color channel. All five arrays share the image's `(height, width)` shape.

use chromacloud_core::{MarkerColor, PixelGrid, Result};
use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::scene::{assemble_scene, Scene, SceneOptions};

/// Divisor mapping 8-bit intensities onto [0, 1]
pub const INTENSITY_SCALE: f32 = 255.0;

/// One of the three color channels of an RGB image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in layer order
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of the channel in an interleaved RGB pixel
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Legend label of the channel's layer
    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "Red Channel",
            Channel::Green => "Green Channel",
            Channel::Blue => "Blue Channel",
        }
    }

    /// Marker color the channel's layer is drawn with
    pub fn marker_color(self) -> MarkerColor {
        match self {
            Channel::Red => MarkerColor::Red,
            Channel::Green => MarkerColor::Green,
            Channel::Blue => MarkerColor::Blue,
        }
    }
}

/// Coordinate grids and normalized channels of one image
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGrids {
    /// Mirrored column index, see [`mirrored_column_grid`]
    pub x: Array2<usize>,
    /// Row index
    pub y: Array2<usize>,
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
    pub height: usize,
    pub width: usize,
}

impl ChannelGrids {
    /// Channel grids in layer order (red, green, blue)
    pub fn channels(&self) -> [&Array2<f32>; 3] {
        [&self.red, &self.green, &self.blue]
    }

    /// Grid for a single channel
    pub fn channel(&self, channel: Channel) -> &Array2<f32> {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Assemble these grids into a renderable [`Scene`]
    pub fn to_scene(&self, options: &SceneOptions) -> Result<Scene> {
        assemble_scene(
            &self.x,
            &self.y,
            self.channels(),
            self.height,
            self.width,
            options,
        )
    }
}

/// Build the X grid: every row is `[width-1, width-2, ..., 0]`.
///
/// Image rows are stored left to right, but the scene's X axis points the
/// other way when viewed from the default camera, so columns are mirrored to
/// keep the rendered cloud in the image's left-right orientation.
pub fn mirrored_column_grid(height: usize, width: usize) -> Array2<usize> {
    Array2::from_shape_fn((height, width), |(_, col)| width - 1 - col)
}

/// Build the Y grid: row `r` holds the constant `r`.
pub fn row_grid(height: usize, width: usize) -> Array2<usize> {
    Array2::from_shape_fn((height, width), |(row, _)| row)
}

/// Scale a plane of 0–255 intensities onto [0, 1]
pub fn normalize_channel(plane: ArrayView2<'_, f32>) -> Array2<f32> {
    plane.mapv(|v| v / INTENSITY_SCALE)
}

/// Split a pixel grid into coordinate grids and normalized channels.
///
/// # Errors
/// [`chromacloud_core::Error::InvalidImageShape`] when the grid is not a
/// three-channel image or has zero area.
pub fn build_channels(grid: &PixelGrid) -> Result<ChannelGrids> {
    grid.validate_rgb()?;
    let (height, width, _) = grid.dim();

    let [red, green, blue] = Channel::ALL.map(|c| normalize_channel(grid.channel(c.index())));

    debug!("built {}x{} channel grids", width, height);
    Ok(ChannelGrids {
        x: mirrored_column_grid(height, width),
        y: row_grid(height, width),
        red,
        green,
        blue,
        height,
        width,
    })
}
