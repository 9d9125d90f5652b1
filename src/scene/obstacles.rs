//! Obstacle extraction from the scene graph

use log::debug;
use nalgebra::{Matrix4, Point3};

use crate::common::{ObstacleSet, Point3D};
use crate::scene::graph::{Scene, SceneNode, SystemTag};

/// Default safety margin added around every extracted box
pub const DEFAULT_MARGIN: f64 = 0.2;

/// World-space boxes of every tagged solid, grown by `margin`
pub fn extract_obstacles(root: &SceneNode, margin: f64) -> ObstacleSet {
    extract_obstacles_for(root, margin, |_, _| true)
}

/// Like [`extract_obstacles`] but keeps only tagged solids accepted by `filter`
pub fn extract_obstacles_for<F>(root: &SceneNode, margin: f64, filter: F) -> ObstacleSet
where
    F: Fn(&SceneNode, &SystemTag) -> bool,
{
    let mut obstacles = ObstacleSet::new();
    root.traverse(&mut |node: &SceneNode, world: &Matrix4<f64>| {
        if let Some(solid) = &node.solid {
            if let Some(system) = &solid.system {
                if filter(node, system) {
                    obstacles.push(solid.local_bounds.transformed(world).expanded_by(margin));
                }
            }
        }
    });
    debug!("extracted {} obstacle boxes (margin {})", obstacles.len(), margin);
    obstacles
}

/// World-space center of the named solid's bounding box
pub fn equipment_center(root: &SceneNode, name: &str) -> Option<Point3D> {
    let mut center = None;
    root.traverse(&mut |node: &SceneNode, world: &Matrix4<f64>| {
        if center.is_some() || node.name != name {
            return;
        }
        if let Some(solid) = &node.solid {
            let local = solid.local_bounds.center();
            let p = world.transform_point(&Point3::new(local.x, local.y, local.z));
            center = Some(Point3D::new(p.x, p.y, p.z));
        }
    });
    center
}

/// Obstacle set cached against the scene revision and margin
#[derive(Debug, Default)]
pub struct ObstacleCache {
    key: Option<(u64, u64)>,
    obstacles: ObstacleSet,
}

impl ObstacleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached set, re-extracted when the scene or the margin changed
    pub fn get(&mut self, scene: &Scene, margin: f64) -> &ObstacleSet {
        let key = (scene.revision(), margin.to_bits());
        if self.key != Some(key) {
            self.obstacles = extract_obstacles(scene.root(), margin);
            self.key = Some(key);
        }
        &self.obstacles
    }
}
