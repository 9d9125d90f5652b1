//! Utility modules for ship_routing

pub mod voxel_grid;
pub mod visualization;

pub use voxel_grid::*;
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
