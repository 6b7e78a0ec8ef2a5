//! # chromacloud algorithms
//!
//! The data-shaping half of the pipeline: splitting a pixel grid into
//! coordinate and normalized channel grids, then flattening those into a
//! three-layer [`Scene`] with its display configuration.

pub mod channels;
pub mod scene;

// Re-export commonly used items
pub use channels::*;
pub use scene::*;
