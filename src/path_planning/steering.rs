//! Continuous steering planner
//!
//! Walks from start to goal in fixed-length steps without discretizing
//! space. A step that would land inside an obstacle box is replaced by a
//! point pushed away from that box's center, and the walk continues from
//! there. This first-order deflection can oscillate near box corners or
//! between two boxes in a narrow passage; the step cap is the only guard.
//!
//! A step arrives once it lands strictly closer than
//! `step_size * arrival_factor` to the goal; the goal itself is then
//! appended as the final point.
//!
//! When the cap is reached the partial walk is returned as-is. Use
//! [`Path3D::reaches`] to tell a completed walk from a partial one.

use log::{debug, warn};

use crate::common::{ObstacleSet, Path3D, PathPlanner3D, Point3D, RoutingError, RoutingResult, DIRECTION_EPSILON};
use crate::config::SteeringConfig;
use crate::path_planning::nudge::{nudge, push_from_center};

/// Greedy step-and-deflect planner
pub struct SteeringPlanner {
    config: SteeringConfig,
}

impl SteeringPlanner {
    pub fn new(config: SteeringConfig) -> Self {
        SteeringPlanner { config }
    }

    /// Create with a step size and default constants
    pub fn from_step_size(step_size: f64) -> Self {
        Self::new(SteeringConfig {
            step_size,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Nudge both endpoints out of their obstacles, then [`walk`](Self::walk)
    pub fn planning(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D> {
        if !start.is_finite() || !goal.is_finite() {
            return Err(RoutingError::InvalidInput("endpoints must be finite".to_string()));
        }
        let heading = goal.to_vector() - start.to_vector();
        let start = nudge(start, obstacles, &heading);
        let end = nudge(goal, obstacles, &-heading);
        self.walk(start, end, obstacles)
    }

    /// Step from `start` to `end` as given, without nudging either endpoint.
    ///
    /// A completed walk starts on `start` and ends on `end` exactly.
    pub fn walk(&self, start: Point3D, end: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D> {
        let step = self.config.step_size;
        if !(step > 0.0) || !step.is_finite() {
            return Err(RoutingError::InvalidInput(format!("step size must be positive, got {}", step)));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(RoutingError::InvalidInput("endpoints must be finite".to_string()));
        }

        if start.distance(&end) < DIRECTION_EPSILON {
            return Ok(Path3D::from_points(vec![start]));
        }

        let arrival_radius = step * self.config.arrival_factor;
        let mut path = Path3D::new();
        let mut current = start;
        let mut deflections = 0usize;

        for _ in 0..self.config.max_steps {
            path.push(current);

            let direction = match current.direction_to(&end) {
                Some(d) => d,
                None => {
                    // Deflected exactly onto the goal
                    path.points.pop();
                    path.push(end);
                    return Ok(path);
                }
            };
            let next = current.offset(&direction, step);

            if let Some(hit) = obstacles.first_containing(&next) {
                current = push_from_center(&next, hit, self.config.steer_offset, &-direction);
                deflections += 1;
                continue;
            }

            if next.distance(&end) < arrival_radius {
                path.push(end);
                debug!(
                    "steering reached goal with {} points, {} deflections",
                    path.len(),
                    deflections
                );
                return Ok(path);
            }

            current = next;
        }

        warn!(
            "steering stopped at the {} step cap, {:.2} from goal after {} deflections",
            self.config.max_steps,
            path.last().map_or(f64::INFINITY, |p| p.distance(&end)),
            deflections
        );
        Ok(path)
    }
}

impl PathPlanner3D for SteeringPlanner {
    fn plan(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D> {
        self.planning(start, goal, obstacles)
    }
}

/// Steer from `start` to `end` in steps of `step_size`
pub fn plan_steering(start: Point3D, end: Point3D, obstacles: &ObstacleSet, step_size: f64) -> RoutingResult<Path3D> {
    SteeringPlanner::from_step_size(step_size).planning(start, end, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Aabb;

    #[test]
    fn test_free_space_walk_ends_exactly_at_goal() {
        let start = Point3D::new(-5.0, 0.0, 0.0);
        let goal = Point3D::new(5.0, 0.0, 0.0);
        let path = plan_steering(start, goal, &ObstacleSet::new(), 0.7).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        // 10 units at 0.7 per step: arrival once within 0.77
        assert_eq!(path.len(), 15);
        assert!((path.total_length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_endpoints() {
        let p = Point3D::new(1.0, 2.0, 3.0);
        let path = plan_steering(p, p, &ObstacleSet::new(), 0.7).unwrap();
        assert_eq!(path.points, vec![p]);
    }

    #[test]
    fn test_short_hop_goes_straight_to_goal() {
        let start = Point3D::origin();
        let goal = Point3D::new(0.3, 0.0, 0.0);
        let path = plan_steering(start, goal, &ObstacleSet::new(), 0.7).unwrap();
        assert_eq!(path.points, vec![start, goal]);
    }

    #[test]
    fn test_deflects_around_pillar() {
        let obstacles = ObstacleSet::from_boxes(vec![Aabb::new(
            Point3D::new(-0.5, -5.0, -0.6),
            Point3D::new(0.5, 5.0, 0.4),
        )]);
        let start = Point3D::new(-5.0, 0.0, 0.0);
        let goal = Point3D::new(5.0, 0.0, 0.0);
        let path = plan_steering(start, goal, &obstacles, 0.7).unwrap();

        assert!(path.reaches(&goal, 1e-12));
        for p in &path.points {
            assert!(!obstacles.contains_point(p));
        }
        assert!(path.total_length() > 10.0);
    }

    #[test]
    fn test_endpoints_nudged_out_of_equipment() {
        let engine = Aabb::from_center_size(Point3D::new(-10.0, 0.5, -2.5), (4.0, 2.5, 2.0));
        let obstacles = ObstacleSet::from_boxes(vec![engine]);
        let start = Point3D::new(-9.0, 0.5, -2.5);
        let goal = Point3D::new(5.0, 0.5, -2.5);
        let path = plan_steering(start, goal, &obstacles, 0.7).unwrap();

        let first = path.first().unwrap();
        assert!((first.x - (-8.4)).abs() < 1e-9);
        assert!(path.reaches(&goal, 1e-12));
    }

    #[test]
    fn test_walk_keeps_endpoints_inside_obstacles() {
        // One nudge would move the end; walk must not
        let obstacles = ObstacleSet::from_boxes(vec![Aabb::from_center_size(Point3D::new(10.0, 0.0, 0.0), (6.0, 6.0, 6.0))]);
        let start = Point3D::new(-10.0, 0.0, 0.0);
        let end = Point3D::new(7.4, 0.0, 0.0);
        let path = SteeringPlanner::new(SteeringConfig::default()).walk(start, end, &obstacles).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
    }

    #[test]
    fn test_arrival_radius_is_exclusive() {
        // Exactly one arrival radius short of the goal after the first step
        let config = SteeringConfig {
            step_size: 1.0,
            arrival_factor: 1.0,
            ..Default::default()
        };
        let goal = Point3D::new(2.0, 0.0, 0.0);
        let path = SteeringPlanner::new(config).walk(Point3D::origin(), goal, &ObstacleSet::new()).unwrap();
        assert_eq!(path.points, vec![Point3D::origin(), Point3D::new(1.0, 0.0, 0.0), goal]);
    }

    #[test]
    fn test_step_cap_returns_partial_path() {
        let config = SteeringConfig {
            max_steps: 5,
            ..Default::default()
        };
        let planner = SteeringPlanner::new(config);
        let goal = Point3D::new(15.0, 0.0, 0.0);
        let path = planner.planning(Point3D::new(-15.0, 0.0, 0.0), goal, &ObstacleSet::new()).unwrap();
        assert_eq!(path.len(), 5);
        assert!(!path.reaches(&goal, 0.7 * 1.1));
    }

    #[test]
    fn test_rejects_zero_step() {
        let result = plan_steering(Point3D::origin(), Point3D::new(1.0, 0.0, 0.0), &ObstacleSet::new(), 0.0);
        assert!(matches!(result, Err(RoutingError::InvalidInput(_))));
    }
}
