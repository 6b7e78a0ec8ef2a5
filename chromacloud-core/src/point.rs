//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// RGB color with components in [0, 1]
pub type Rgb = [f32; 3];

/// Named display colors used for channel layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    Red,
    Green,
    Blue,
}

impl MarkerColor {
    /// Display name, as a CSS-style color keyword
    pub fn name(self) -> &'static str {
        match self {
            MarkerColor::Red => "red",
            MarkerColor::Green => "green",
            MarkerColor::Blue => "blue",
        }
    }

    /// Linear RGB value of the color
    pub fn rgb(self) -> Rgb {
        match self {
            MarkerColor::Red => [1.0, 0.0, 0.0],
            // CSS "green" is half intensity
            MarkerColor::Green => [0.0, 0.5, 0.0],
            MarkerColor::Blue => [0.0, 0.0, 1.0],
        }
    }
}

impl std::fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_color_names() {
        assert_eq!(MarkerColor::Red.to_string(), "red");
        assert_eq!(MarkerColor::Green.name(), "green");
        assert_eq!(MarkerColor::Blue.rgb(), [0.0, 0.0, 1.0]);
    }
}
