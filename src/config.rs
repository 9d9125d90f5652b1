//! Planner configuration
//!
//! All tuning constants live here instead of in the planners, so that two
//! structures can be routed at different resolutions side by side. Every
//! section deserializes with defaults for missing keys, which lets a TOML
//! file override only what it cares about.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Point3D, RoutingError, RoutingResult};
use crate::path_planning::nudge::DEFAULT_NUDGE_OFFSET;

/// Axis-aligned world volume covered by the voxel lattice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Point3D,
    pub max: Point3D,
}

impl WorldBounds {
    pub fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: &Point3D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(RoutingError::InvalidInput("world bounds must be finite".to_string()));
        }
        if self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z {
            return Err(RoutingError::InvalidInput(format!(
                "world bounds min {:?} must be below max {:?}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Point3D::new(-20.0, -5.0, -10.0),
            max: Point3D::new(20.0, 5.0, 10.0),
        }
    }
}

/// Configuration for the voxel A* planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of one voxel in world units
    pub cell_size: f64,
    /// Give up (no path) after this many node expansions
    pub max_expansions: Option<usize>,
    /// World volume discretized by the lattice
    pub bounds: WorldBounds,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.5,
            max_expansions: None,
            bounds: WorldBounds::default(),
        }
    }
}

/// Configuration for the continuous steering planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance advanced per step
    pub step_size: f64,
    /// Push applied away from an obstacle center when a step collides
    pub steer_offset: f64,
    /// Iteration cap, deflections included
    pub max_steps: usize,
    /// Arrival radius as a multiple of `step_size`
    pub arrival_factor: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            step_size: 0.7,
            steer_offset: 1.0,
            max_steps: 300,
            arrival_factor: 1.1,
        }
    }
}

/// Configuration for line-of-sight simplification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Segment length ignored at each end of a visibility query
    pub inset: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self { inset: 0.01 }
    }
}

/// Which raw planner the router runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerMethod {
    Grid,
    Steering,
    /// Grid first, steering only if the grid search finds nothing
    GridWithSteeringFallback,
}

impl Default for PlannerMethod {
    fn default() -> Self {
        PlannerMethod::Grid
    }
}

/// Top-level configuration consumed by [`crate::router::Router`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Safety margin added around every extracted obstacle box
    pub margin: f64,
    /// Offset used when nudging query endpoints out of obstacles, for every planner
    pub nudge_offset: f64,
    pub method: PlannerMethod,
    pub grid: GridConfig,
    pub steering: SteeringConfig,
    pub simplify: SimplifyConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            margin: 0.2,
            nudge_offset: DEFAULT_NUDGE_OFFSET,
            method: PlannerMethod::default(),
            grid: GridConfig::default(),
            steering: SteeringConfig::default(),
            simplify: SimplifyConfig::default(),
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(contents: &str) -> RoutingResult<Self> {
        let config: RouterConfig = toml::from_str(contents).map_err(|e| RoutingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RoutingResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> RoutingResult<String> {
        toml::to_string_pretty(self).map_err(|e| RoutingError::Config(e.to_string()))
    }

    pub fn validate(&self) -> RoutingResult<()> {
        self.grid.bounds.validate()?;
        let positive = [
            ("cell_size", self.grid.cell_size),
            ("step_size", self.steering.step_size),
            ("steer_offset", self.steering.steer_offset),
            ("arrival_factor", self.steering.arrival_factor),
            ("nudge_offset", self.nudge_offset),
        ];
        for (name, value) in positive.iter() {
            if !(*value > 0.0) || !value.is_finite() {
                return Err(RoutingError::Config(format!("{} must be positive and finite, got {}", name, value)));
            }
        }
        if self.steering.max_steps == 0 {
            return Err(RoutingError::Config("max_steps must be at least 1".to_string()));
        }
        let non_negative = |v: f64| v >= 0.0 && v.is_finite();
        if !non_negative(self.margin) || !non_negative(self.simplify.inset) {
            return Err(RoutingError::Config("margin and inset must be finite and not negative".to_string()));
        }
        Ok(())
    }
}
