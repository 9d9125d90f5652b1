//! ship_routing - 3D route planning between ship equipment
//!
//! This crate extracts box obstacles from a scene graph, plans routes
//! through them with a voxel-grid A* search or a continuous steering
//! walk, and simplifies the result by line of sight.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod scene;
pub mod router;

// Re-export common types for convenience
pub use common::{Aabb, ObstacleSet, Path3D, Point3D, VoxelIndex};
pub use common::{PathPlanner3D, PathSmoother};
pub use common::{RoutingError, RoutingResult};
pub use config::{PlannerMethod, RouterConfig, WorldBounds};
pub use path_planning::{nudge, plan_grid, plan_steering, simplify};
pub use router::{Route, Router};
pub use scene::{extract_obstacles, Scene, SceneNode, Solid, SystemTag};
