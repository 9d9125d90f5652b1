//! Axis-aligned boxes and the obstacle set the planners query

use itertools::iproduct;
use nalgebra::{Matrix4, Point3};

use crate::common::types::{Point3D, DIRECTION_EPSILON};

/// Axis-aligned bounding box in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3D,
    pub max: Point3D,
}

impl Aabb {
    /// Build a box from two opposite corners in any order
    pub fn new(a: Point3D, b: Point3D) -> Self {
        Self {
            min: Point3D::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3D::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn from_center_size(center: Point3D, size: (f64, f64, f64)) -> Self {
        let (hx, hy, hz) = (size.0.abs() / 2.0, size.1.abs() / 2.0, size.2.abs() / 2.0);
        Self {
            min: Point3D::new(center.x - hx, center.y - hy, center.z - hz),
            max: Point3D::new(center.x + hx, center.y + hy, center.z + hz),
        }
    }

    /// Inclusive containment: points on a face count as inside
    pub fn contains_point(&self, p: &Point3D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn center(&self) -> Point3D {
        Point3D::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn size(&self) -> (f64, f64, f64) {
        (self.max.x - self.min.x, self.max.y - self.min.y, self.max.z - self.min.z)
    }

    /// Grow the box by `margin` on every side
    pub fn expanded_by(&self, margin: f64) -> Self {
        Self {
            min: Point3D::new(self.min.x - margin, self.min.y - margin, self.min.z - margin),
            max: Point3D::new(self.max.x + margin, self.max.y + margin, self.max.z + margin),
        }
    }

    /// Axis-aligned bounds of this box after an affine transform
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        let xs = [self.min.x, self.max.x];
        let ys = [self.min.y, self.max.y];
        let zs = [self.min.z, self.max.z];

        let mut min = Point3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3D::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (&x, &y, &z) in iproduct!(&xs, &ys, &zs) {
            let p = transform.transform_point(&Point3::new(x, y, z));
            min = Point3D::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3D::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Self { min, max }
    }

    /// Slab test of the segment `p1 -> p2` against the box.
    ///
    /// Only the part of the segment between `inset` and `length - inset`
    /// is considered, so a segment that merely starts or ends on a face
    /// does not count as crossing it.
    pub fn intersects_segment(&self, p1: &Point3D, p2: &Point3D, inset: f64) -> bool {
        let origin = p1.to_vector();
        let delta = p2.to_vector() - origin;
        let length = delta.norm();
        if length < DIRECTION_EPSILON || length <= 2.0 * inset {
            return false;
        }
        let dir = delta / length;
        let min = self.min.to_vector();
        let max = self.max.to_vector();

        let mut t_near = inset;
        let mut t_far = length - inset;
        for axis in 0..3 {
            if dir[axis].abs() < DIRECTION_EPSILON {
                // Parallel to this slab
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return false;
            }
        }
        true
    }
}

/// Ordered collection of obstacle boxes, read-only while planning
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    boxes: Vec<Aabb>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    pub fn from_boxes(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }

    pub fn push(&mut self, aabb: Aabb) {
        self.boxes.push(aabb);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Aabb> {
        self.boxes.iter()
    }

    pub fn as_slice(&self) -> &[Aabb] {
        &self.boxes
    }

    /// First box, in insertion order, containing `point`
    pub fn first_containing(&self, point: &Point3D) -> Option<&Aabb> {
        self.boxes.iter().find(|b| b.contains_point(point))
    }

    pub fn contains_point(&self, point: &Point3D) -> bool {
        self.first_containing(point).is_some()
    }

    /// True if the segment crosses any box (see [`Aabb::intersects_segment`])
    pub fn segment_blocked(&self, p1: &Point3D, p2: &Point3D, inset: f64) -> bool {
        self.boxes.iter().any(|b| b.intersects_segment(p1, p2, inset))
    }
}

impl From<Vec<Aabb>> for ObstacleSet {
    fn from(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }
}

impl<'a> IntoIterator for &'a ObstacleSet {
    type Item = &'a Aabb;
    type IntoIter = std::slice::Iter<'a, Aabb>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_box() -> Aabb {
        Aabb::new(Point3D::new(-1.0, -1.0, -1.0), Point3D::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_normalizes_corners() {
        let b = Aabb::new(Point3D::new(1.0, -2.0, 3.0), Point3D::new(-1.0, 2.0, -3.0));
        assert_eq!(b.min, Point3D::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Point3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_contains_point_is_inclusive() {
        let b = unit_box();
        assert!(b.contains_point(&Point3D::new(1.0, 0.0, 0.0)));
        assert!(b.contains_point(&Point3D::origin()));
        assert!(!b.contains_point(&Point3D::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn test_expanded_by_margin() {
        let b = unit_box().expanded_by(0.2);
        assert_relative_eq!(b.min.x, -1.2);
        assert_relative_eq!(b.max.z, 1.2);
        assert_eq!(b.center(), Point3D::origin());
    }

    #[test]
    fn test_transformed_translation_and_rotation() {
        let b = Aabb::from_center_size(Point3D::origin(), (4.0, 2.0, 2.0));
        let moved = b.transformed(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));
        assert_relative_eq!(moved.min.x, 8.0);
        assert_relative_eq!(moved.max.x, 12.0);

        // Quarter turn about y swaps the x and z extents
        let turned = b.transformed(&Matrix4::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0));
        let (sx, _, sz) = turned.size();
        assert_relative_eq!(sx, 2.0, epsilon = 1e-9);
        assert_relative_eq!(sz, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_through_box() {
        let b = unit_box();
        assert!(b.intersects_segment(&Point3D::new(-5.0, 0.0, 0.0), &Point3D::new(5.0, 0.0, 0.0), 0.01));
        assert!(!b.intersects_segment(&Point3D::new(-5.0, 2.0, 0.0), &Point3D::new(5.0, 2.0, 0.0), 0.01));
    }

    #[test]
    fn test_segment_limited_to_its_length() {
        let b = unit_box();
        // The infinite ray would hit the box, the segment stops short of it
        assert!(!b.intersects_segment(&Point3D::new(-5.0, 0.0, 0.0), &Point3D::new(-2.0, 0.0, 0.0), 0.01));
        // Pointing away
        assert!(!b.intersects_segment(&Point3D::new(-2.0, 0.0, 0.0), &Point3D::new(-5.0, 0.0, 0.0), 0.01));
    }

    #[test]
    fn test_segment_ending_on_face_is_clear_with_inset() {
        let b = unit_box();
        let touching = Point3D::new(-1.0, 0.0, 0.0);
        assert!(!b.intersects_segment(&Point3D::new(-3.0, 0.0, 0.0), &touching, 0.01));
        assert!(b.intersects_segment(&Point3D::new(-3.0, 0.0, 0.0), &touching, 0.0));
    }

    #[test]
    fn test_degenerate_segment_never_intersects() {
        let b = unit_box();
        assert!(!b.intersects_segment(&Point3D::origin(), &Point3D::origin(), 0.0));
    }

    #[test]
    fn test_obstacle_set_first_containing_in_order() {
        let first = unit_box();
        let second = unit_box().expanded_by(1.0);
        let set = ObstacleSet::from_boxes(vec![first, second]);
        assert_eq!(set.first_containing(&Point3D::origin()), Some(&first));
        assert_eq!(set.first_containing(&Point3D::new(1.5, 0.0, 0.0)), Some(&second));
        assert!(set.first_containing(&Point3D::new(5.0, 0.0, 0.0)).is_none());
    }
}
