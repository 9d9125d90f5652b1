//! Common traits defining interfaces for route planners

use crate::common::aabb::ObstacleSet;
use crate::common::error::RoutingResult;
use crate::common::types::{Path3D, Point3D};

/// Trait for 3D path planning algorithms
///
/// An `Ok` empty path means the planner gave up without reaching the
/// goal. `Err` is reserved for inputs the planner refuses to work on.
pub trait PathPlanner3D {
    /// Plan a raw path from start to goal around the obstacles
    fn plan(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D>;
}

/// Trait for post-processing passes over a raw path
pub trait PathSmoother {
    fn smooth(&self, path: &Path3D, obstacles: &ObstacleSet) -> Path3D;
}
