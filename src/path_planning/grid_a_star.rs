//! Voxel A* path planning
//!
//! Discretizes the world volume into a voxel lattice, rasterizes the
//! obstacle boxes into it, and searches the 26-connected lattice from
//! the start voxel to the goal voxel.
//!
//! Search rules:
//! - step cost is the Euclidean length of the neighbor offset
//! - heuristic is the Euclidean voxel distance to the goal
//! - the open set pops the lowest f first, equal f in insertion order
//! - a voxel is expanded at most once and never re-opened, even if a
//!   cheaper route to it turns up later. This can miss the strictly
//!   optimal path in rare layouts; returned paths are reproducible.
//! - a neighbor whose open entry already has an f no worse than the new
//!   one is dropped, otherwise a new entry is pushed next to the old one
//! - occupancy is only checked for neighbors, never for the seed or the
//!   goal voxel themselves, so callers should nudge endpoints first

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::iproduct;
use log::{debug, warn};
use ordered_float::OrderedFloat;

use crate::common::{ObstacleSet, Path3D, PathPlanner3D, Point3D, RoutingError, RoutingResult, VoxelIndex};
use crate::config::{GridConfig, WorldBounds};
use crate::utils::VoxelGrid;

/// Cooperative cancellation flag, checked once per search iteration
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Arena entry of the search tree
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    voxel: VoxelIndex,
    g: f64,
    f: f64,
    parent_index: Option<usize>,
}

/// Open set key: lowest f first, then lowest arena index. Nodes are
/// appended to the arena as they are pushed, so the index is the
/// insertion order.
type OpenEntry = Reverse<(OrderedFloat<f64>, usize)>;

/// Counters of one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Voxels closed and expanded
    pub expansions: usize,
    /// Entries pushed onto the open set, the seed included
    pub pushed: usize,
    /// Neighbors dropped because an open entry with no worse f existed
    pub dropped_duplicates: usize,
    /// Popped entries skipped because their voxel was already closed
    pub stale_skipped: usize,
}

/// Voxel A* planner
pub struct GridAStarPlanner {
    config: GridConfig,
    cancel: Option<CancelToken>,
    motion: Vec<(i32, i32, i32, f64)>,
}

impl GridAStarPlanner {
    pub fn new(config: GridConfig) -> Self {
        GridAStarPlanner {
            config,
            cancel: None,
            motion: Self::get_motion_model(),
        }
    }

    /// Create from world bounds and a cell size with no expansion cap
    pub fn from_cell_size(bounds: WorldBounds, cell_size: f64) -> Self {
        Self::new(GridConfig {
            bounds,
            cell_size,
            ..Default::default()
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn get_motion_model() -> Vec<(i32, i32, i32, f64)> {
        // di, dj, dk, cost (26-connected lattice)
        iproduct!(-1..=1, -1..=1, -1..=1)
            .filter(|&(di, dj, dk)| (di, dj, dk) != (0, 0, 0))
            .map(|(di, dj, dk)| (di, dj, dk, ((di * di + dj * dj + dk * dk) as f64).sqrt()))
            .collect()
    }

    fn validate_endpoint(&self, name: &str, p: &Point3D) -> RoutingResult<()> {
        if !p.is_finite() || !self.config.bounds.contains(p) {
            return Err(RoutingError::InvalidInput(format!(
                "{} {:?} is outside world bounds {:?}",
                name, p, self.config.bounds
            )));
        }
        Ok(())
    }

    fn build_path(&self, grid: &VoxelGrid, goal_index: usize, node_storage: &[SearchNode]) -> Path3D {
        let mut points = Vec::new();
        let mut current_index = Some(goal_index);

        while let Some(index) = current_index {
            let node = &node_storage[index];
            points.push(grid.calc_position(&node.voxel));
            current_index = node.parent_index;
        }

        points.reverse();
        Path3D::from_points(points)
    }

    /// Run the search. An empty path means no route exists within the lattice.
    pub fn planning(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D> {
        self.search(start, goal, obstacles).map(|(path, _)| path)
    }

    /// [`planning`](Self::planning) plus the counters of the search
    pub fn search(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<(Path3D, SearchStats)> {
        self.validate_endpoint("start", &start)?;
        self.validate_endpoint("goal", &goal)?;

        let grid = VoxelGrid::new(self.config.bounds, self.config.cell_size, obstacles)?;
        let start_voxel = grid.calc_index(&start);
        let goal_voxel = grid.calc_index(&goal);

        let mut open_set: BinaryHeap<OpenEntry> = BinaryHeap::new();
        let mut open_best: HashMap<VoxelIndex, f64> = HashMap::new();
        let mut closed_set: HashSet<VoxelIndex> = HashSet::new();
        let mut node_storage: Vec<SearchNode> = Vec::new();
        let mut stats = SearchStats::default();

        let start_h = start_voxel.distance(&goal_voxel);
        node_storage.push(SearchNode {
            voxel: start_voxel,
            g: 0.0,
            f: start_h,
            parent_index: None,
        });
        open_best.insert(start_voxel, start_h);
        open_set.push(Reverse((OrderedFloat(start_h), 0)));
        stats.pushed += 1;

        while let Some(Reverse((_, current_index))) = open_set.pop() {
            if self.cancel.as_ref().map_or(false, |c| c.is_cancelled()) {
                debug!("grid search cancelled after {} expansions", stats.expansions);
                return Err(RoutingError::Cancelled);
            }

            let current = node_storage[current_index];

            // Stale duplicate of a voxel that was already expanded
            if closed_set.contains(&current.voxel) {
                stats.stale_skipped += 1;
                continue;
            }

            if current.voxel == goal_voxel {
                debug!("goal voxel reached, cost {:.2}, {:?}", current.f, stats);
                return Ok((self.build_path(&grid, current_index, &node_storage), stats));
            }

            if let Some(max) = self.config.max_expansions {
                if stats.expansions >= max {
                    warn!("grid search hit the expansion cap of {}, giving up", max);
                    return Ok((Path3D::new(), stats));
                }
            }

            closed_set.insert(current.voxel);
            stats.expansions += 1;

            for &(di, dj, dk, cost) in &self.motion {
                let voxel = current.voxel.offset(di, dj, dk);

                if !grid.is_valid(&voxel) || closed_set.contains(&voxel) {
                    continue;
                }

                let g = current.g + cost;
                let f = g + voxel.distance(&goal_voxel);

                if let Some(&existing) = open_best.get(&voxel) {
                    if existing <= f {
                        stats.dropped_duplicates += 1;
                        continue;
                    }
                }

                node_storage.push(SearchNode {
                    voxel,
                    g,
                    f,
                    parent_index: Some(current_index),
                });
                open_best.insert(voxel, f);
                open_set.push(Reverse((OrderedFloat(f), node_storage.len() - 1)));
                stats.pushed += 1;
            }
        }

        warn!(
            "open set exhausted after {} expansions, no path from {:?} to {:?}",
            stats.expansions, start, goal
        );
        Ok((Path3D::new(), stats))
    }
}

impl PathPlanner3D for GridAStarPlanner {
    fn plan(&self, start: Point3D, goal: Point3D, obstacles: &ObstacleSet) -> RoutingResult<Path3D> {
        self.planning(start, goal, obstacles)
    }
}

/// Plan on a voxel lattice of `cell_size` covering `bounds`
pub fn plan_grid(
    start: Point3D,
    end: Point3D,
    obstacles: &ObstacleSet,
    bounds: &WorldBounds,
    cell_size: f64,
) -> RoutingResult<Path3D> {
    GridAStarPlanner::from_cell_size(*bounds, cell_size).planning(start, end, obstacles)
}
