//! Core data structures and traits for chromacloud
//!
//! This crate provides the types shared by every pipeline stage: the pixel
//! grid produced by the image loader, points and point clouds consumed by
//! the scene, and the common error type.

pub mod point;
pub mod point_cloud;
pub mod grid;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use grid::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
