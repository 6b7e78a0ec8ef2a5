//! # chromacloud GPU
//!
//! wgpu rendering for chromacloud scenes: every point is drawn as a
//! screen-space square marker of fixed pixel size, layered per channel, with
//! a wireframe box around the data.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chromacloud_gpu::{MarkerInstance, MarkerRenderer, RenderConfig};
//! use chromacloud_core::Point3f;
//!
//! async fn example(window: Arc<winit::window::Window>) -> chromacloud_core::Result<()> {
//!     let mut renderer = MarkerRenderer::new(window, RenderConfig::default()).await?;
//!     let red = vec![MarkerInstance::from_point(&Point3f::origin(), [1.0, 0.0, 0.0], 2.0)];
//!     renderer.set_layers(&[red]);
//!     renderer.render()?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod renderer;

// Re-export commonly used items
pub use device::GpuContext;
pub use renderer::{
    box_edges, opengl_to_wgpu_matrix, CameraUniform, LineVertex, MarkerInstance, MarkerRenderer,
    RenderConfig,
};
