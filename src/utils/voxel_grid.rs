// Voxel lattice for grid based 3D planning

use std::collections::HashSet;

use log::debug;

use crate::common::{ObstacleSet, Point3D, RoutingError, RoutingResult, VoxelIndex};
use crate::config::WorldBounds;

/// Fixed-size lattice over the world bounds with its occupied voxels
///
/// `world = bounds.min + index * cell_size` and
/// `index = round((world - bounds.min) / cell_size)`.
pub struct VoxelGrid {
    pub bounds: WorldBounds,
    pub cell_size: f64,
    pub x_width: i32,
    pub y_width: i32,
    pub z_width: i32,
    occupied: HashSet<VoxelIndex>,
}

impl VoxelGrid {
    /// Build the lattice and rasterize every obstacle box into it
    pub fn new(bounds: WorldBounds, cell_size: f64, obstacles: &ObstacleSet) -> RoutingResult<Self> {
        bounds.validate()?;
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(RoutingError::InvalidInput(format!("cell size must be positive, got {}", cell_size)));
        }

        let x_width = ((bounds.max.x - bounds.min.x) / cell_size).ceil() as i32;
        let y_width = ((bounds.max.y - bounds.min.y) / cell_size).ceil() as i32;
        let z_width = ((bounds.max.z - bounds.min.z) / cell_size).ceil() as i32;

        let mut grid = VoxelGrid {
            bounds,
            cell_size,
            x_width,
            y_width,
            z_width,
            occupied: HashSet::new(),
        };

        for aabb in obstacles {
            let lo = grid.index_space(&aabb.min);
            let hi = grid.index_space(&aabb.max);
            let (i0, i1) = grid.clamp_span(lo.0.floor(), hi.0.ceil(), x_width);
            let (j0, j1) = grid.clamp_span(lo.1.floor(), hi.1.ceil(), y_width);
            let (k0, k1) = grid.clamp_span(lo.2.floor(), hi.2.ceil(), z_width);
            for i in i0..=i1 {
                for j in j0..=j1 {
                    for k in k0..=k1 {
                        grid.occupied.insert(VoxelIndex::new(i, j, k));
                    }
                }
            }
        }

        debug!(
            "voxel grid {}x{}x{} ({} voxels) at {} per cell, {} occupied voxels from {} obstacles",
            x_width,
            y_width,
            z_width,
            grid.volume(),
            cell_size,
            grid.occupied.len(),
            obstacles.len()
        );
        Ok(grid)
    }

    fn index_space(&self, p: &Point3D) -> (f64, f64, f64) {
        (
            (p.x - self.bounds.min.x) / self.cell_size,
            (p.y - self.bounds.min.y) / self.cell_size,
            (p.z - self.bounds.min.z) / self.cell_size,
        )
    }

    // Inclusive index span clipped to [0, width - 1]; empty spans come back inverted.
    fn clamp_span(&self, lo: f64, hi: f64, width: i32) -> (i32, i32) {
        let lo = lo.max(0.0);
        let hi = hi.min((width - 1) as f64);
        (lo as i32, hi as i32)
    }

    /// Nearest voxel to a world position, clamped into the lattice
    pub fn calc_index(&self, p: &Point3D) -> VoxelIndex {
        let (x, y, z) = self.index_space(p);
        VoxelIndex::new(
            (x.round() as i32).clamp(0, self.x_width - 1),
            (y.round() as i32).clamp(0, self.y_width - 1),
            (z.round() as i32).clamp(0, self.z_width - 1),
        )
    }

    /// World position of a voxel
    pub fn calc_position(&self, index: &VoxelIndex) -> Point3D {
        Point3D::new(
            self.bounds.min.x + index.i as f64 * self.cell_size,
            self.bounds.min.y + index.j as f64 * self.cell_size,
            self.bounds.min.z + index.k as f64 * self.cell_size,
        )
    }

    pub fn in_bounds(&self, index: &VoxelIndex) -> bool {
        index.i >= 0 && index.i < self.x_width
            && index.j >= 0 && index.j < self.y_width
            && index.k >= 0 && index.k < self.z_width
    }

    pub fn is_occupied(&self, index: &VoxelIndex) -> bool {
        self.occupied.contains(index)
    }

    /// Inside the lattice and not blocked
    pub fn is_valid(&self, index: &VoxelIndex) -> bool {
        self.in_bounds(index) && !self.is_occupied(index)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Total voxel count, saturating for absurdly fine lattices
    pub fn volume(&self) -> u64 {
        (self.x_width.max(0) as u64)
            .saturating_mul(self.y_width.max(0) as u64)
            .saturating_mul(self.z_width.max(0) as u64)
    }
}
