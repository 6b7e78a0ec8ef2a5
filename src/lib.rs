//! # chromacloud
//!
//! Turns a raster image into three 3D point clouds, one per RGB channel.
//! Every pixel becomes a point at `(mirrored column, row, intensity)` in each
//! layer, and the layers are shown together in an interactive viewer.
//!
//! This umbrella crate re-exports the workspace crates and wires them into a
//! single [`pipeline`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chromacloud::prelude::*;
//!
//! let config = VisualizerConfig::for_image("photo.jpg");
//! let scene = build_scene(&config)?;
//! assert_eq!(scene.layers.len(), 3);
//! # Ok::<(), chromacloud::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables `visualization`
//! - `visualization`: Interactive wgpu/winit viewer and [`pipeline::run`]

pub mod config;
pub mod pipeline;

// Re-export core functionality
pub use chromacloud_core::*;

// Re-export sub-crates
pub use chromacloud_algorithms as algorithms;
pub use chromacloud_io as io;

#[cfg(feature = "visualization")]
pub use chromacloud_gpu as gpu;

#[cfg(feature = "visualization")]
pub use chromacloud_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use chromacloud_core::*;
    pub use chromacloud_algorithms::*;
    pub use chromacloud_io::{decode_rgb, load_image};

    pub use crate::config::{load_config, ConfigOverrides, VisualizerConfig};
    pub use crate::pipeline::build_scene;

    #[cfg(feature = "visualization")]
    pub use crate::pipeline::run;

    #[cfg(feature = "visualization")]
    pub use chromacloud_visualization::{show_scene, SceneViewer};
}
