//! Image in, scene out (and optionally onto the screen)

use chromacloud_algorithms::{build_channels, Scene};
use chromacloud_core::Result;
use chromacloud_io::load_image;
use log::info;

use crate::config::VisualizerConfig;

/// Load the configured image and assemble its three channel layers
pub fn build_scene(config: &VisualizerConfig) -> Result<Scene> {
    config.validate()?;

    let grid = load_image(&config.image_path, config.scale_factor)?;
    info!(
        "Loaded {} ({}x{})",
        config.image_path.display(),
        grid.width(),
        grid.height()
    );

    let channels = build_channels(&grid)?;

    let scene = channels.to_scene(&config.scene_options())?;
    info!(
        "Scene: {} layers of {} points, aspect {:?}",
        scene.layers.len(),
        scene.points_per_layer(),
        scene.layout.aspect_mode
    );
    Ok(scene)
}

/// Build the scene and show it, blocking until the window is closed
#[cfg(feature = "visualization")]
pub fn run(config: &VisualizerConfig) -> Result<()> {
    let scene = build_scene(config)?;
    let title = config
        .image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chromacloud".to_string());
    chromacloud_visualization::show_scene_titled(scene, title)
}
