//! Line-of-sight path simplification (greedy string-pulling)
//!
//! From the current anchor, jump to the farthest later waypoint that is
//! visible through the obstacle boxes, then repeat from there. The result
//! is a subsequence of the input keeping its first and last points. It is
//! greedy, so it is not guaranteed to have the fewest possible vertices.

use crate::common::{ObstacleSet, Path3D, PathSmoother, Point3D};
use crate::config::SimplifyConfig;

/// String-pulling pass over raw planner output
pub struct PathSimplifier {
    config: SimplifyConfig,
}

impl PathSimplifier {
    pub fn new(config: SimplifyConfig) -> Self {
        PathSimplifier { config }
    }

    pub fn simplify_points(&self, points: &[Point3D], obstacles: &ObstacleSet) -> Vec<Point3D> {
        if points.len() <= 2 {
            return points.to_vec();
        }

        let last = points.len() - 1;
        let mut simplified = vec![points[0]];
        let mut anchor = 0;

        while anchor < last {
            let mut next = last;
            // Adjacent waypoints are always kept connected
            while next > anchor + 1 && obstacles.segment_blocked(&points[anchor], &points[next], self.config.inset) {
                next -= 1;
            }
            simplified.push(points[next]);
            anchor = next;
        }

        simplified
    }
}

impl Default for PathSimplifier {
    fn default() -> Self {
        Self::new(SimplifyConfig::default())
    }
}

impl PathSmoother for PathSimplifier {
    fn smooth(&self, path: &Path3D, obstacles: &ObstacleSet) -> Path3D {
        Path3D::from_points(self.simplify_points(&path.points, obstacles))
    }
}

/// Reduce `path` to the waypoints needed to keep line of sight
pub fn simplify(path: &Path3D, obstacles: &ObstacleSet) -> Path3D {
    PathSimplifier::default().smooth(path, obstacles)
}
