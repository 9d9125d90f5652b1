//! Route planning facade
//!
//! Runs the full query: validate the endpoints, nudge them out of
//! obstacles, plan a raw path with the configured method, then simplify
//! it. Unlike the planners, the router reports a missing route as
//! [`RoutingError::NoPathFound`].

use log::{info, warn};

use crate::common::{ObstacleSet, Path3D, PathSmoother, Point3D, RoutingError, RoutingResult};
use crate::config::{PlannerMethod, RouterConfig};
use crate::path_planning::{nudge_with_offset, CancelToken, GridAStarPlanner, PathSimplifier, SteeringPlanner};
use crate::scene::{equipment_center, extract_obstacles_for, Scene};

/// Result of a successful routing query
#[derive(Debug, Clone)]
pub struct Route {
    /// Simplified path from the nudged start to the nudged end
    pub path: Path3D,
    /// Vertex count before simplification
    pub raw_len: usize,
    /// Planner that produced the path
    pub method_used: PlannerMethod,
}

pub struct Router {
    config: RouterConfig,
    cancel: Option<CancelToken>,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Router { config, cancel: None }
    }

    /// Make grid searches observe `token`
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route between the centers of two named pieces of equipment in `scene`.
    ///
    /// The two pieces of equipment are left out of the obstacle set: the
    /// route connects to them, so they must not block their own endpoints.
    pub fn route_between(&self, scene: &Scene, start_name: &str, end_name: &str) -> RoutingResult<Route> {
        let start = equipment_center(scene.root(), start_name)
            .ok_or_else(|| RoutingError::InvalidInput(format!("no solid named '{}'", start_name)))?;
        let end = equipment_center(scene.root(), end_name)
            .ok_or_else(|| RoutingError::InvalidInput(format!("no solid named '{}'", end_name)))?;
        let obstacles = extract_obstacles_for(scene.root(), self.config.margin, |node, _| {
            node.name != start_name && node.name != end_name
        });
        self.route(start, end, &obstacles)
    }

    pub fn route(&self, start: Point3D, end: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Route> {
        self.config.validate()?;
        for (name, p) in [("start", &start), ("end", &end)].iter() {
            if !p.is_finite() || !self.config.grid.bounds.contains(p) {
                return Err(RoutingError::InvalidInput(format!("{} {:?} is outside world bounds", name, p)));
            }
        }

        let heading = end.to_vector() - start.to_vector();
        let start = nudge_with_offset(start, obstacles, &heading, self.config.nudge_offset);
        let end = nudge_with_offset(end, obstacles, &-heading, self.config.nudge_offset);
        // A nudge can push an endpoint that sat on the boundary out of the lattice
        let start = self.clamp_to_bounds(start);
        let end = self.clamp_to_bounds(end);

        let (raw, method_used) = match self.config.method {
            PlannerMethod::Grid => (self.plan_grid(start, end, obstacles)?, PlannerMethod::Grid),
            PlannerMethod::Steering => (self.plan_steering(start, end, obstacles)?, PlannerMethod::Steering),
            PlannerMethod::GridWithSteeringFallback => match self.plan_grid(start, end, obstacles)? {
                Some(path) => (Some(path), PlannerMethod::Grid),
                None => {
                    warn!("grid search found no route, falling back to steering");
                    (self.plan_steering(start, end, obstacles)?, PlannerMethod::Steering)
                }
            },
        };

        let raw = raw.ok_or(RoutingError::NoPathFound)?;
        let raw_len = raw.len();
        let path = PathSimplifier::new(self.config.simplify.clone()).smooth(&raw, obstacles);
        info!(
            "route found with {:?}: {} raw points, {} after simplification, length {:.2}",
            method_used,
            raw_len,
            path.len(),
            path.total_length()
        );

        Ok(Route { path, raw_len, method_used })
    }

    fn clamp_to_bounds(&self, p: Point3D) -> Point3D {
        let b = &self.config.grid.bounds;
        Point3D::new(
            p.x.max(b.min.x).min(b.max.x),
            p.y.max(b.min.y).min(b.max.y),
            p.z.max(b.min.z).min(b.max.z),
        )
    }

    /// Grid path with its ends replaced by the exact query points, `None` if unreachable
    fn plan_grid(&self, start: Point3D, end: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Option<Path3D>> {
        let mut planner = GridAStarPlanner::new(self.config.grid.clone());
        if let Some(token) = &self.cancel {
            planner = planner.with_cancel_token(token.clone());
        }
        let mut path = planner.planning(start, end, obstacles)?;
        if path.is_empty() {
            return Ok(None);
        }

        if path.len() == 1 {
            path.points[0] = start;
            if start != end {
                path.push(end);
            }
        } else {
            let last = path.len() - 1;
            path.points[0] = start;
            path.points[last] = end;
        }
        Ok(Some(path))
    }

    /// Steering path, `None` if the walk stopped short of the goal
    fn plan_steering(&self, start: Point3D, end: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Option<Path3D>> {
        let planner = SteeringPlanner::new(self.config.steering.clone());
        // Endpoints are nudged already; a completed walk ends on `end` exactly
        let path = planner.walk(start, end, obstacles)?;
        if path.reaches(&end, 0.0) {
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Aabb;
    use crate::path_planning::DEFAULT_NUDGE_OFFSET;
    use crate::scene::{SceneNode, Solid, SystemTag};
    use approx::assert_relative_eq;

    fn router(method: PlannerMethod) -> Router {
        let mut config = RouterConfig::default();
        config.method = method;
        Router::new(config)
    }

    fn wall_with_gap() -> ObstacleSet {
        ObstacleSet::from_boxes(vec![Aabb::new(Point3D::new(-1.0, -5.0, -10.0), Point3D::new(1.0, 5.0, 6.0))])
    }

    #[test]
    fn test_route_endpoints_are_exact() {
        let start = Point3D::new(-5.1, 0.2, 0.3);
        let end = Point3D::new(5.2, -0.1, 0.4);
        let route = router(PlannerMethod::Grid).route(start, end, &wall_with_gap()).unwrap();

        assert_eq!(route.path.first(), Some(&start));
        assert_eq!(route.path.last(), Some(&end));
        assert!(route.path.len() <= route.raw_len);
        assert_eq!(route.method_used, PlannerMethod::Grid);
    }

    #[test]
    fn test_simplified_route_keeps_line_of_sight() {
        let obstacles = wall_with_gap();
        let route = router(PlannerMethod::Grid)
            .route(Point3D::new(-5.0, 0.0, 0.0), Point3D::new(5.0, 0.0, 0.0), &obstacles)
            .unwrap();
        assert!(route.path.len() >= 3);
        for w in route.path.points.windows(2) {
            assert!(!obstacles.segment_blocked(&w[0], &w[1], 0.01));
        }
    }

    #[test]
    fn test_blocked_grid_is_no_path_found() {
        let full_wall = ObstacleSet::from_boxes(vec![Aabb::new(
            Point3D::new(-1.0, -5.0, -10.0),
            Point3D::new(1.0, 5.0, 10.0),
        )]);
        let result = router(PlannerMethod::Grid).route(Point3D::new(-5.0, 0.0, 0.0), Point3D::new(5.0, 0.0, 0.0), &full_wall);
        assert!(matches!(result, Err(RoutingError::NoPathFound)));
    }

    #[test]
    fn test_fallback_to_steering() {
        let mut config = RouterConfig::default();
        config.method = PlannerMethod::GridWithSteeringFallback;
        config.grid.max_expansions = Some(1);
        let route = Router::new(config)
            .route(Point3D::new(-5.0, 0.0, 0.0), Point3D::new(5.0, 0.0, 0.0), &ObstacleSet::new())
            .unwrap();
        assert_eq!(route.method_used, PlannerMethod::Steering);
        assert_eq!(route.path.len(), 2);
    }

    #[test]
    fn test_steering_route_simplifies_to_straight_line() {
        let start = Point3D::new(-5.0, 1.0, 2.0);
        let end = Point3D::new(6.0, -1.0, -3.0);
        let route = router(PlannerMethod::Steering).route(start, end, &ObstacleSet::new()).unwrap();
        assert_eq!(route.path.points, vec![start, end]);
        assert!(route.raw_len > 2);
    }

    #[test]
    fn test_steering_route_ends_on_nudged_endpoint() {
        // A single nudge leaves the end inside this box; the route must still end there
        let obstacles = ObstacleSet::from_boxes(vec![Aabb::from_center_size(Point3D::new(10.0, 0.0, 0.0), (6.0, 6.0, 6.0))]);
        let start = Point3D::new(-10.0, 0.0, 0.0);
        let route = router(PlannerMethod::Steering)
            .route(start, Point3D::new(8.0, 0.0, 0.0), &obstacles)
            .unwrap();

        assert_eq!(route.method_used, PlannerMethod::Steering);
        assert_eq!(route.path.first(), Some(&start));
        let end = route.path.last().unwrap();
        assert_relative_eq!(end.x, 8.0 - DEFAULT_NUDGE_OFFSET, epsilon = 1e-12);
        assert_relative_eq!(end.y, 0.0);
        assert!(obstacles.contains_point(end));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let result = router(PlannerMethod::Steering).route(
            Point3D::new(0.0, 9.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            &ObstacleSet::new(),
        );
        assert!(matches!(result, Err(RoutingError::InvalidInput(_))));
    }

    #[test]
    fn test_coincident_endpoints_give_trivial_route() {
        let p = Point3D::new(2.0, 0.0, 1.0);
        let route = router(PlannerMethod::Grid).route(p, p, &ObstacleSet::new()).unwrap();
        assert_eq!(route.path.points, vec![p]);
    }

    #[test]
    fn test_route_between_equipment() {
        let root = SceneNode::group("ship")
            .with_child(
                SceneNode::solid("engine", Solid::cuboid(4.0, 2.5, 2.0).tagged(SystemTag::Propulsion))
                    .with_translation(-10.0, 0.5, -2.5),
            )
            .with_child(
                SceneNode::solid("switchboard", Solid::cuboid(3.0, 2.0, 0.5).tagged(SystemTag::Electrical))
                    .with_translation(8.0, 1.0, -6.0),
            )
            .with_child(
                SceneNode::solid("riser", Solid::cuboid(1.0, 10.0, 4.0).tagged(SystemTag::Piping))
                    .with_translation(0.0, 0.0, -4.0),
            );
        let scene = Scene::new(root);
        let route = Router::default().route_between(&scene, "engine", "switchboard").unwrap();

        assert_eq!(route.path.first(), Some(&Point3D::new(-10.0, 0.5, -2.5)));
        assert_eq!(route.path.last(), Some(&Point3D::new(8.0, 1.0, -6.0)));

        // The riser sits on the straight line and must be routed around
        let riser = crate::scene::extract_obstacles_for(scene.root(), 0.2, |node, _| node.name == "riser");
        assert!(route.path.len() >= 3);
        for w in route.path.points.windows(2) {
            assert!(!riser.segment_blocked(&w[0], &w[1], 0.01));
        }

        assert!(matches!(
            Router::default().route_between(&scene, "engine", "bridge"),
            Err(RoutingError::InvalidInput(_))
        ));
    }
}
