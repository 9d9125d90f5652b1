//! Endpoint nudging
//!
//! Moves a query point that lies inside an obstacle box outward, away from
//! the center of the first box containing it. This is a single correction:
//! a point buried in overlapping boxes can still be inside another box
//! afterwards.

use nalgebra::Vector3;

use crate::common::{Aabb, ObstacleSet, Point3D, DIRECTION_EPSILON};

/// Default displacement applied by [`nudge`]
pub const DEFAULT_NUDGE_OFFSET: f64 = 0.6;

/// Push `point` away from `obstacle`'s center by `magnitude`.
///
/// When the point sits on the center, `preferred` is used instead; when that
/// is degenerate too the point is pushed straight up (+y).
pub fn push_from_center(point: &Point3D, obstacle: &Aabb, magnitude: f64, preferred: &Vector3<f64>) -> Point3D {
    let away = point.to_vector() - obstacle.center().to_vector();
    let direction = away
        .try_normalize(DIRECTION_EPSILON)
        .or_else(|| preferred.try_normalize(DIRECTION_EPSILON))
        .unwrap_or_else(Vector3::y);
    point.offset(&direction, magnitude)
}

/// [`nudge`] with an explicit offset
pub fn nudge_with_offset(point: Point3D, obstacles: &ObstacleSet, preferred: &Vector3<f64>, offset: f64) -> Point3D {
    match obstacles.first_containing(&point) {
        Some(obstacle) => push_from_center(&point, obstacle, offset, preferred),
        None => point,
    }
}

/// Move `point` out of the first obstacle containing it.
///
/// Points outside every obstacle are returned unchanged.
pub fn nudge(point: Point3D, obstacles: &ObstacleSet, preferred: &Vector3<f64>) -> Point3D {
    nudge_with_offset(point, obstacles, preferred, DEFAULT_NUDGE_OFFSET)
}
