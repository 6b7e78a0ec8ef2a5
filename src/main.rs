use std::path::PathBuf;

use anyhow::Context;
use chromacloud::algorithms::AspectMode;
use chromacloud::config::{load_config, ConfigOverrides, VisualizerConfig};
use chromacloud::pipeline;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the RGB channels of an image as 3D point clouds")]
struct Args {
    /// Image to visualize (PNG, JPEG, BMP, ...)
    image: Option<PathBuf>,

    /// Resize factor applied before building the point clouds
    #[arg(short, long)]
    scale: Option<f32>,

    /// Window width in pixels
    #[arg(long)]
    window_width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    window_height: Option<u32>,

    /// Scene box proportions: manual or auto
    #[arg(long)]
    aspect: Option<AspectMode>,

    /// JSON config file; explicit flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build the scene and log a summary without opening a window
    #[arg(long)]
    no_display: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            image_path: self.image.clone(),
            scale_factor: self.scale,
            window_width: self.window_width,
            window_height: self.window_height,
            aspect_mode: self.aspect,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => VisualizerConfig::default(),
    };
    let config = args.overrides().apply(base);
    config.validate()?;

    if args.no_display {
        let scene = pipeline::build_scene(&config)?;
        for layer in &scene.layers {
            info!("{}: {} points ({})", layer.name, layer.points.len(), layer.color);
        }
        info!("Box sides: {:?}", scene.box_sides());
        return Ok(());
    }

    run(&config)
}

#[cfg(feature = "visualization")]
fn run(config: &VisualizerConfig) -> anyhow::Result<()> {
    pipeline::run(config)?;
    Ok(())
}

#[cfg(not(feature = "visualization"))]
fn run(_config: &VisualizerConfig) -> anyhow::Result<()> {
    anyhow::bail!("built without the `visualization` feature; rerun with --no-display")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_file() -> VisualizerConfig {
        VisualizerConfig {
            image_path: PathBuf::from("from_file.png"),
            scale_factor: 0.5,
            window_width: 800,
            window_height: 600,
            aspect_mode: AspectMode::Auto,
        }
    }

    #[test]
    fn test_explicit_flags_override_config() {
        let args = Args::try_parse_from([
            "chromacloud",
            "photo.jpg",
            "--scale",
            "0.25",
            "--window-height",
            "900",
            "--aspect",
            "manual",
        ])
        .unwrap();
        let config = args.overrides().apply(from_file());

        assert_eq!(config.image_path, PathBuf::from("photo.jpg"));
        assert_eq!(config.scale_factor, 0.25);
        assert_eq!(config.window_height, 900);
        assert_eq!(config.aspect_mode, AspectMode::Manual);
        // not given on the command line
        assert_eq!(config.window_width, 800);
    }

    #[test]
    fn test_omitted_flags_keep_config() {
        let args = Args::try_parse_from(["chromacloud", "--config", "run.json", "--no-display"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("run.json")));
        assert!(args.no_display);
        assert_eq!(args.overrides(), ConfigOverrides::default());
        assert_eq!(args.overrides().apply(from_file()), from_file());
    }

    #[test]
    fn test_aspect_flag_parsing() {
        let args = Args::try_parse_from(["chromacloud", "a.png", "--aspect", "AUTO"]).unwrap();
        assert_eq!(args.aspect, Some(AspectMode::Auto));
        assert!(Args::try_parse_from(["chromacloud", "a.png", "--aspect", "sideways"]).is_err());
    }
}
