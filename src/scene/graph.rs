//! Minimal scene graph the obstacle extractor walks
//!
//! Nodes carry a local translation / rotation / scale and optionally a
//! solid. World transforms compose parent-first, as in a regular scene
//! graph: `world = parent_world * translation * rotation * scale`.

use std::fmt;

use nalgebra::{Matrix4, Rotation3, Vector3};

use crate::common::{Aabb, Point3D};

/// Identifier of the routable system a solid belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SystemTag {
    Propulsion,
    Electrical,
    Hvac,
    Piping,
    Other(String),
}

impl fmt::Display for SystemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemTag::Propulsion => write!(f, "propulsion"),
            SystemTag::Electrical => write!(f, "electrical"),
            SystemTag::Hvac => write!(f, "hvac"),
            SystemTag::Piping => write!(f, "piping"),
            SystemTag::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Geometry attached to a node, reduced to its local bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub local_bounds: Aabb,
    /// Untagged solids are decoration and never become obstacles
    pub system: Option<SystemTag>,
}

impl Solid {
    pub fn new(local_bounds: Aabb) -> Self {
        Self { local_bounds, system: None }
    }

    /// Box of the given size centered on the node origin
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        Self::new(Aabb::from_center_size(Point3D::origin(), (width, height, depth)))
    }

    /// Cylinder along the local y axis
    pub fn cylinder(radius_top: f64, radius_bottom: f64, height: f64) -> Self {
        let r = radius_top.abs().max(radius_bottom.abs());
        Self::cuboid(2.0 * r, height, 2.0 * r)
    }

    pub fn tagged(mut self, system: SystemTag) -> Self {
        self.system = Some(system);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub translation: Vector3<f64>,
    /// Roll, pitch, yaw in radians
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
    pub solid: Option<Solid>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Empty grouping node
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translation: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            solid: None,
            children: Vec::new(),
        }
    }

    pub fn solid(name: &str, solid: Solid) -> Self {
        Self {
            solid: Some(solid),
            ..Self::group(name)
        }
    }

    pub fn with_translation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.translation = Vector3::new(x, y, z);
        self
    }

    pub fn with_rotation_euler(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.rotation = Vector3::new(roll, pitch, yaw);
        self
    }

    pub fn with_scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn local_matrix(&self) -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z);
        Matrix4::new_translation(&self.translation)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Depth-first pre-order walk handing each node its world matrix
    pub fn traverse<F>(&self, visit: &mut F)
    where
        F: FnMut(&SceneNode, &Matrix4<f64>),
    {
        self.traverse_from(&Matrix4::identity(), visit);
    }

    fn traverse_from<F>(&self, parent_world: &Matrix4<f64>, visit: &mut F)
    where
        F: FnMut(&SceneNode, &Matrix4<f64>),
    {
        let world = parent_world * self.local_matrix();
        visit(self, &world);
        for child in &self.children {
            child.traverse_from(&world, visit);
        }
    }
}

/// Scene root plus a revision counter bumped on every mutable access
#[derive(Debug, Clone)]
pub struct Scene {
    root: SceneNode,
    revision: u64,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self { root, revision: 0 }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Mutable access to the structure; invalidates cached obstacle sets
    pub fn root_mut(&mut self) -> &mut SceneNode {
        self.revision += 1;
        &mut self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_matrix_composes_parents() {
        let root = SceneNode::group("ship").with_translation(1.0, 0.0, 0.0).with_child(
            SceneNode::group("deck")
                .with_scale(2.0, 2.0, 2.0)
                .with_child(SceneNode::solid("engine", Solid::cuboid(1.0, 1.0, 1.0)).with_translation(0.0, 0.0, 3.0)),
        );

        let mut engine_world = None;
        root.traverse(&mut |node: &SceneNode, world: &Matrix4<f64>| {
            if node.name == "engine" {
                engine_world = Some(*world);
            }
        });
        let origin = engine_world.unwrap().transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(origin.x, 1.0);
        assert_relative_eq!(origin.z, 6.0);
    }

    #[test]
    fn test_traversal_is_pre_order() {
        let root = SceneNode::group("a")
            .with_child(SceneNode::group("b").with_child(SceneNode::group("c")))
            .with_child(SceneNode::group("d"));
        let mut names = Vec::new();
        root.traverse(&mut |node: &SceneNode, _: &Matrix4<f64>| names.push(node.name.clone()));
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cylinder_bounds() {
        let solid = Solid::cylinder(0.6, 0.8, 2.0);
        assert_eq!(solid.local_bounds.size(), (1.6, 2.0, 1.6));
        assert!(solid.system.is_none());
        assert_eq!(solid.tagged(SystemTag::Hvac).system, Some(SystemTag::Hvac));
    }

    #[test]
    fn test_root_mut_bumps_revision() {
        let mut scene = Scene::new(SceneNode::group("ship"));
        assert_eq!(scene.revision(), 0);
        scene.root_mut().add_child(SceneNode::group("pump room"));
        assert_eq!(scene.revision(), 1);
        assert_eq!(format!("{}", SystemTag::Other("fuel".to_string())), "fuel");
    }
}
