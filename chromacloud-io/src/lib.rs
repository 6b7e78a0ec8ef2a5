//! I/O operations for chromacloud
//!
//! This crate turns raster image files into [`PixelGrid`]s. Decoding is
//! delegated to the `image` crate, so PNG, JPEG, BMP and the other formats it
//! enables by default are all accepted; the format is detected from the file
//! content rather than its extension.

pub mod image;
pub mod error;

pub use error::*;
pub use crate::image::{decode_rgb, load_image, resize_dimensions, RESIZE_FILTER};

#[doc(no_inline)]
pub use chromacloud_core::PixelGrid;
