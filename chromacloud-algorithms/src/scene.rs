//! Scene assembly
//!
//! Flattens coordinate and channel grids into three point-cloud layers and
//! attaches the display configuration (window size, axis titles, aspect
//! ratio) the viewer needs. Nothing is rendered here.

use chromacloud_core::{Drawable, Error, MarkerColor, Point3f, PointCloud, Result, Rgb};
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::channels::Channel;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1600;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 1200;

/// Marker size of every layer, in screen pixels
pub const MARKER_SIZE: f32 = 2.0;

pub const AXIS_TITLES: [&str; 3] = ["X (Width)", "Y (Height)", "Intensity"];

/// Manual aspect ratio references for the X and Z axes
pub const MANUAL_X_RATIO: f32 = 10.0;
pub const MANUAL_Z_RATIO: f32 = 4.0;

/// Above this extent ratio between axes, automatic aspect falls back to a cube
pub const AUTO_CUBE_THRESHOLD: f32 = 4.0;

/// How the scene box proportions are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// Fixed `(10, height / width * 10, 4)`
    #[default]
    Manual,
    /// Proportional to the data extents, or a cube when one axis dominates
    Auto,
}

impl std::str::FromStr for AspectMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(AspectMode::Manual),
            "auto" => Ok(AspectMode::Auto),
            other => Err(Error::Config(format!(
                "unknown aspect mode '{}', expected 'manual' or 'auto'",
                other
            ))),
        }
    }
}

/// Relative lengths of the scene box along X, Y and Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AspectRatio {
    pub const CUBE: AspectRatio = AspectRatio { x: 1.0, y: 1.0, z: 1.0 };

    /// Fixed ratio keeping the image's proportions on the X/Y plane
    pub fn manual(height: usize, width: usize) -> Self {
        Self {
            x: MANUAL_X_RATIO,
            y: (height as f32 / width as f32) * MANUAL_X_RATIO,
            z: MANUAL_Z_RATIO,
        }
    }

    /// Ratio derived from the extents of the data.
    ///
    /// Extents are normalized so the longest is 1. When the longest extent is
    /// more than [`AUTO_CUBE_THRESHOLD`] times the shortest, or any extent is
    /// zero, a cube is used instead.
    pub fn from_extents(extents: [f32; 3]) -> Self {
        let longest = extents.iter().copied().fold(0.0_f32, f32::max);
        let shortest = extents.iter().copied().fold(f32::INFINITY, f32::min);
        if shortest <= 0.0 || longest > AUTO_CUBE_THRESHOLD * shortest {
            return Self::CUBE;
        }

        Self {
            x: extents[0] / longest,
            y: extents[1] / longest,
            z: extents[2] / longest,
        }
    }

    fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Display parameters of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub window_width: u32,
    pub window_height: u32,
    pub aspect_mode: AspectMode,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            aspect_mode: AspectMode::Manual,
        }
    }
}

impl SceneOptions {
    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(Error::Config(format!(
                "window size must be positive, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        Ok(())
    }
}

/// One labeled point cloud of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PointLayer {
    pub name: String,
    pub channel: Channel,
    pub color: MarkerColor,
    pub marker_size: f32,
    pub points: PointCloud<Point3f>,
    pub visible: bool,
}

impl PointLayer {
    pub fn rgb(&self) -> Rgb {
        self.color.rgb()
    }
}

/// Scene-level display configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub window_width: u32,
    pub window_height: u32,
    pub axis_titles: [String; 3],
    pub aspect_mode: AspectMode,
    /// Ratio used in [`AspectMode::Manual`]
    pub manual_ratio: AspectRatio,
}

/// Axis-aligned data extents over every layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: Point3f,
    pub max: Point3f,
}

impl SceneBounds {
    pub fn extents(&self) -> [f32; 3] {
        let d = self.max - self.min;
        [d.x, d.y, d.z]
    }

    /// Map a data point into a box of `sides` centered on the origin.
    ///
    /// Axes with zero extent collapse onto the box center.
    pub fn to_world(&self, p: &Point3f, sides: [f32; 3]) -> Point3f {
        let extents = self.extents();
        let mut out = [0.0_f32; 3];
        for axis in 0..3 {
            if extents[axis] > 0.0 {
                let t = (p[axis] - self.min[axis]) / extents[axis];
                out[axis] = (t - 0.5) * sides[axis];
            }
        }
        Point3f::new(out[0], out[1], out[2])
    }
}

/// Three channel layers plus their display configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub layers: Vec<PointLayer>,
    pub layout: SceneLayout,
    pub height: usize,
    pub width: usize,
}

impl Scene {
    /// Number of points in each layer
    pub fn points_per_layer(&self) -> usize {
        self.height * self.width
    }

    /// Extents over all layers, `None` for an empty scene
    pub fn bounds(&self) -> Option<SceneBounds> {
        self.layers
            .iter()
            .filter_map(|layer| layer.points.bounding_box())
            .reduce(|(amin, amax), (bmin, bmax)| {
                (amin.inf(&bmin), amax.sup(&bmax))
            })
            .map(|(min, max)| SceneBounds { min, max })
    }

    /// Effective aspect ratio for the configured [`AspectMode`]
    pub fn aspect_ratio(&self) -> AspectRatio {
        match self.layout.aspect_mode {
            AspectMode::Manual => self.layout.manual_ratio,
            AspectMode::Auto => self
                .bounds()
                .map(|b| AspectRatio::from_extents(b.extents()))
                .unwrap_or(AspectRatio::CUBE),
        }
    }

    /// Side lengths of the scene box: the aspect ratio scaled so the longest side is 1
    pub fn box_sides(&self) -> [f32; 3] {
        let ratio = self.aspect_ratio().as_array();
        let longest = ratio.iter().copied().fold(0.0_f32, f32::max);
        if longest <= 0.0 {
            return [1.0; 3];
        }
        ratio.map(|r| r / longest)
    }

    /// Layer points mapped into the scene box, one vector per layer
    pub fn world_points(&self) -> Vec<Vec<Point3f>> {
        let Some(bounds) = self.bounds() else {
            return self.layers.iter().map(|_| Vec::new()).collect();
        };
        let sides = self.box_sides();
        self.layers
            .iter()
            .map(|layer| layer.points.iter().map(|p| bounds.to_world(p, sides)).collect())
            .collect()
    }

    /// Flip the visibility of layer `index`, returning its new state
    pub fn toggle_layer(&mut self, index: usize) -> Option<bool> {
        let layer = self.layers.get_mut(index)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }
}

/// Build a [`Scene`] from coordinate grids and normalized channels.
///
/// Every array is flattened in row-major order, so index `i` of X, Y and each
/// channel refers to the same source pixel. Layers are emitted in red, green,
/// blue order with the fixed labels and marker size.
///
/// # Errors
/// * [`Error::ShapeMismatch`] if any array's shape differs from `(height, width)`
/// * [`Error::InvalidImageShape`] if `height` or `width` is zero
/// * [`Error::Config`] if the window size is not positive
pub fn assemble_scene(
    x: &Array2<usize>,
    y: &Array2<usize>,
    channels: [&Array2<f32>; 3],
    height: usize,
    width: usize,
    options: &SceneOptions,
) -> Result<Scene> {
    options.validate()?;
    if height == 0 || width == 0 {
        return Err(Error::InvalidImageShape(format!(
            "cannot assemble a scene for a {}x{} image",
            width, height
        )));
    }

    let expected = height * width;
    let shapes = [("X", x.dim()), ("Y", y.dim())]
        .into_iter()
        .chain(Channel::ALL.iter().zip(channels.iter()).map(|(c, a)| (c.label(), a.dim())));
    for (name, dim) in shapes {
        if dim.0 * dim.1 != expected || dim != (height, width) {
            return Err(Error::ShapeMismatch(format!(
                "{} has shape {:?} ({} values), expected ({}, {}) ({} values)",
                name,
                dim,
                dim.0 * dim.1,
                height,
                width,
                expected
            )));
        }
    }

    let layers: Vec<PointLayer> = Channel::ALL
        .iter()
        .zip(channels)
        .map(|(&channel, z)| {
            let points = x
                .iter()
                .zip(y.iter())
                .zip(z.iter())
                .map(|((&px, &py), &pz)| Point3f::new(px as f32, py as f32, pz))
                .collect();
            PointLayer {
                name: channel.label().to_string(),
                channel,
                color: channel.marker_color(),
                marker_size: MARKER_SIZE,
                points,
                visible: true,
            }
        })
        .collect();

    debug!(
        "assembled scene: {} layers x {} points, window {}x{}",
        layers.len(),
        expected,
        options.window_width,
        options.window_height
    );

    Ok(Scene {
        layers,
        layout: SceneLayout {
            window_width: options.window_width,
            window_height: options.window_height,
            axis_titles: AXIS_TITLES.map(String::from),
            aspect_mode: options.aspect_mode,
            manual_ratio: AspectRatio::manual(height, width),
        },
        height,
        width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{build_channels, mirrored_column_grid, row_grid};
    use approx::assert_relative_eq;
    use chromacloud_core::PixelGrid;
    use ndarray::Array3;

    /// Grid whose red value encodes the pixel position
    fn indexed_grid(height: usize, width: usize) -> PixelGrid {
        PixelGrid::from_array(Array3::from_shape_fn((height, width, 3), |(r, c, ch)| match ch {
            0 => (r * width + c) as f32,
            1 => 255.0 - (r * width + c) as f32,
            _ => 17.0,
        }))
    }

    fn scene_for(height: usize, width: usize, options: &SceneOptions) -> Scene {
        build_channels(&indexed_grid(height, width))
            .unwrap()
            .to_scene(options)
            .unwrap()
    }

    #[test]
    fn test_three_labeled_layers() {
        let scene = scene_for(2, 3, &SceneOptions::default());

        assert_eq!(scene.layers.len(), 3);
        let names: Vec<_> = scene.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Red Channel", "Green Channel", "Blue Channel"]);
        let colors: Vec<_> = scene.layers.iter().map(|l| l.color).collect();
        assert_eq!(colors, [MarkerColor::Red, MarkerColor::Green, MarkerColor::Blue]);
        for layer in &scene.layers {
            assert_eq!(layer.marker_size, MARKER_SIZE);
            assert_eq!(layer.points.len(), 6);
            assert!(layer.visible);
        }
    }

    #[test]
    fn test_layout_configuration() {
        let options = SceneOptions {
            window_width: 800,
            window_height: 600,
            aspect_mode: AspectMode::Manual,
        };
        let scene = scene_for(50, 100, &options);

        assert_eq!(scene.layout.window_width, 800);
        assert_eq!(scene.layout.window_height, 600);
        assert_eq!(scene.layout.axis_titles, ["X (Width)", "Y (Height)", "Intensity"]);
        let ratio = scene.aspect_ratio();
        assert_relative_eq!(ratio.x, 10.0);
        assert_relative_eq!(ratio.y, 5.0);
        assert_relative_eq!(ratio.z, 4.0);
    }

    #[test]
    fn test_flatten_order_matches_source_pixels() {
        let (height, width) = (3, 4);
        let scene = scene_for(height, width, &SceneOptions::default());
        let red = &scene.layers[0].points;

        for (i, p) in red.iter().enumerate() {
            let row = i / width;
            let col = i % width;
            assert_eq!(p.y as usize, row);
            assert_eq!(p.x as usize, width - 1 - col);
            assert_relative_eq!(p.z, (row * width + col) as f32 / 255.0);

            // Same pixel in the other layers
            let green = scene.layers[1].points[i];
            assert_eq!((green.x, green.y), (p.x, p.y));
            assert_relative_eq!(green.z, (255 - (row * width + col)) as f32 / 255.0);
        }
    }

    #[test]
    fn test_single_pixel_scene() {
        let scene = scene_for(1, 1, &SceneOptions::default());
        assert_eq!(scene.points_per_layer(), 1);
        for layer in &scene.layers {
            assert_eq!(layer.points.len(), 1);
            assert_eq!((layer.points[0].x, layer.points[0].y), (0.0, 0.0));
        }
        // X and Y extents collapse onto the box center
        let sides = scene.box_sides();
        for layer in scene.world_points() {
            assert_eq!(layer.len(), 1);
            assert_eq!((layer[0].x, layer[0].y), (0.0, 0.0));
            assert!(layer[0].z.abs() <= sides[2] / 2.0 + 1e-6);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let x = mirrored_column_grid(2, 3);
        let y = row_grid(2, 3);
        let good = Array2::<f32>::zeros((2, 3));
        let short = Array2::<f32>::zeros((2, 2));

        let result = assemble_scene(&x, &y, [&good, &short, &good], 2, 3, &SceneOptions::default());
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));

        let transposed_y = row_grid(3, 2);
        let result = assemble_scene(&x, &transposed_y, [&good, &good, &good], 2, 3, &SceneOptions::default());
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_rejects_zero_window() {
        let options = SceneOptions {
            window_width: 0,
            ..SceneOptions::default()
        };
        let grids = build_channels(&indexed_grid(2, 2)).unwrap();
        assert!(matches!(grids.to_scene(&options), Err(Error::Config(_))));
    }

    #[test]
    fn test_auto_aspect_from_extents() {
        let balanced = AspectRatio::from_extents([4.0, 2.0, 1.5]);
        assert_relative_eq!(balanced.x, 1.0);
        assert_relative_eq!(balanced.y, 0.5);
        assert_relative_eq!(balanced.z, 0.375);

        // Exactly four times is still proportional
        let edge = AspectRatio::from_extents([4.0, 2.0, 1.0]);
        assert_relative_eq!(edge.z, 0.25);

        // A square image: X and Y agree but intensity spans at most 1
        assert_eq!(AspectRatio::from_extents([199.0, 199.0, 1.0]), AspectRatio::CUBE);
        assert_eq!(AspectRatio::from_extents([100.0, 10.0, 1.0]), AspectRatio::CUBE);
        assert_eq!(AspectRatio::from_extents([5.0, 3.0, 0.0]), AspectRatio::CUBE);
        assert_eq!(AspectRatio::from_extents([0.0, 0.0, 0.0]), AspectRatio::CUBE);
    }

    #[test]
    fn test_auto_aspect_on_scene() {
        let options = SceneOptions {
            aspect_mode: AspectMode::Auto,
            ..SceneOptions::default()
        };
        // X spans 0..=199, Z well under 1
        let scene = scene_for(10, 200, &options);
        assert_eq!(scene.aspect_ratio(), AspectRatio::CUBE);

        let square = scene_for(20, 20, &options);
        assert_eq!(square.aspect_ratio(), AspectRatio::CUBE);
        assert_eq!(square.box_sides(), [1.0; 3]);
    }

    #[test]
    fn test_world_points_fit_box() {
        let scene = scene_for(4, 8, &SceneOptions::default());
        let sides = scene.box_sides();
        assert_relative_eq!(sides[0], 1.0);
        assert_relative_eq!(sides[1], 0.5);
        assert_relative_eq!(sides[2], 0.4);

        for layer in scene.world_points() {
            assert_eq!(layer.len(), 32);
            for p in layer {
                for axis in 0..3 {
                    assert!(p[axis].abs() <= sides[axis] / 2.0 + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_toggle_layer() {
        let mut scene = scene_for(2, 2, &SceneOptions::default());
        assert_eq!(scene.toggle_layer(1), Some(false));
        assert!(!scene.layers[1].visible);
        assert_eq!(scene.toggle_layer(1), Some(true));
        assert_eq!(scene.toggle_layer(3), None);
    }

    #[test]
    fn test_aspect_mode_parsing() {
        assert_eq!("manual".parse::<AspectMode>().unwrap(), AspectMode::Manual);
        assert_eq!("AUTO".parse::<AspectMode>().unwrap(), AspectMode::Auto);
        assert!("cube".parse::<AspectMode>().is_err());
    }
}
