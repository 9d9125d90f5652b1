//! Common types used throughout ship_routing

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Vectors shorter than this are treated as having no direction
pub const DIRECTION_EPSILON: f64 = 1e-9;

/// 3D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Move the point by `magnitude` along `direction` (assumed unit length)
    pub fn offset(&self, direction: &Vector3<f64>, magnitude: f64) -> Point3D {
        Point3D::from(self.to_vector() + direction * magnitude)
    }

    /// Unit vector pointing from `self` towards `target`, if the two differ
    pub fn direction_to(&self, target: &Point3D) -> Option<Vector3<f64>> {
        (target.to_vector() - self.to_vector()).try_normalize(DIRECTION_EPSILON)
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1, z: tuple.2 }
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], z: v[2] }
    }
}

/// Path represented as a sequence of 3D points
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path3D {
    pub points: Vec<Point3D>,
}

impl Path3D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point3D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point3D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point3D> {
        self.points.last()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn z_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    /// True when the path ends within `tolerance` of `goal`
    pub fn reaches(&self, goal: &Point3D, tolerance: f64) -> bool {
        self.last().map_or(false, |p| p.distance(goal) <= tolerance)
    }
}

impl From<Vec<Point3D>> for Path3D {
    fn from(points: Vec<Point3D>) -> Self {
        Self { points }
    }
}

impl IntoIterator for Path3D {
    type Item = Point3D;
    type IntoIter = std::vec::IntoIter<Point3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Integer cell coordinate of the voxel lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelIndex {
    pub i: i32,
    pub j: i32,
    pub k: i32,
}

impl VoxelIndex {
    pub fn new(i: i32, j: i32, k: i32) -> Self {
        Self { i, j, k }
    }

    pub fn offset(&self, di: i32, dj: i32, dk: i32) -> Self {
        Self { i: self.i + di, j: self.j + dj, k: self.k + dk }
    }

    /// Euclidean distance in voxel units
    pub fn distance(&self, other: &VoxelIndex) -> f64 {
        (((self.i - other.i).pow(2) + (self.j - other.j).pow(2) + (self.k - other.k).pow(2)) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point3d_distance() {
        let p1 = Point3D::new(0.0, 0.0, 0.0);
        let p2 = Point3D::new(2.0, 3.0, 6.0);
        assert!((p1.distance(&p2) - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_direction_to_same_point_is_none() {
        let p = Point3D::new(1.0, 2.0, 3.0);
        assert!(p.direction_to(&p).is_none());

        let dir = p.direction_to(&Point3D::new(1.0, 2.0, 8.0)).unwrap();
        assert!((dir.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_path3d_total_length() {
        let path = Path3D::from_points(vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 2.0),
        ]);
        assert!((path.total_length() - 3.0).abs() < 1e-10);
        assert!(path.reaches(&Point3D::new(1.0, 0.0, 2.05), 0.1));
        assert!(!Path3D::new().reaches(&Point3D::origin(), 1.0));
    }

    #[test]
    fn test_voxel_distance() {
        let a = VoxelIndex::new(0, 0, 0);
        assert!((a.distance(&a.offset(1, 1, 1)) - 3f64.sqrt()).abs() < 1e-12);
    }
}
