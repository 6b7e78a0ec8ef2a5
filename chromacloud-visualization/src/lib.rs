//! Interactive viewing of chromacloud scenes
//!
//! Wraps the wgpu marker renderer in a winit window with an orbit camera:
//! - left drag orbits, right drag pans, the wheel zooms
//! - `1`, `2`, `3` toggle the red, green and blue layers
//! - `R` resets the camera, `Esc` or `Q` closes the window

pub mod camera;
pub mod interactive_viewer;

pub use camera::*;
pub use interactive_viewer::*;

use chromacloud_algorithms::Scene;
use chromacloud_core::Result;

/// Show a scene in an interactive window, blocking until it is closed
pub fn show_scene(scene: Scene) -> Result<()> {
    SceneViewer::new(scene).run()
}

/// Like [`show_scene`] with a custom window title prefix
pub fn show_scene_titled(scene: Scene, title: impl Into<String>) -> Result<()> {
    SceneViewer::new(scene).with_title(title).run()
}
