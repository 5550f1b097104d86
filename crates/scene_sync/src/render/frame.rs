//! Per-frame view of a host's graph
//!
//! Extracts what a renderer needs from the object graph: the active camera's
//! matrices, the visible meshes with complete geometry/material slots, and the
//! visible lights, all with world matrices composed down the node hierarchy.

use crate::foundation::math::{Mat4, Vec3};
use crate::protocol::NodeId;
use crate::scene::{Camera, Geometry, Light, Material, NodeRole, ObjectGraph, SceneObject};

/// A mesh ready to draw
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    /// Mesh node
    pub node: NodeId,
    /// World transform
    pub world: Mat4,
    /// Bound geometry
    pub geometry: &'a Geometry,
    /// Bound material
    pub material: &'a Material,
    /// Shadow casting flag of the mesh
    pub cast_shadow: bool,
    /// Shadow receiving flag of the mesh
    pub receive_shadow: bool,
}

/// A light affecting the frame
#[derive(Debug, Clone)]
pub struct LightItem<'a> {
    /// Light node
    pub node: NodeId,
    /// World-space position
    pub position: Vec3,
    /// World-space forward direction (-Z of the node)
    pub direction: Vec3,
    /// Light parameters
    pub light: &'a Light,
}

/// Borrowed view of one frame
pub struct FrameView<'a> {
    graph: &'a ObjectGraph,
    camera_id: NodeId,
    camera: &'a Camera,
    camera_world: Mat4,
}

impl<'a> FrameView<'a> {
    /// View through the graph's active camera
    ///
    /// Returns `None` when there is no active camera or it no longer resolves
    /// to a camera node.
    pub fn new(graph: &'a ObjectGraph) -> Option<Self> {
        let camera_id = graph.active_camera()?;
        let camera = graph.object(camera_id)?.camera()?;
        let camera_world = graph.world_matrix(camera_id)?;
        Some(Self { graph, camera_id, camera, camera_world })
    }

    /// Object graph being drawn
    pub const fn graph(&self) -> &'a ObjectGraph {
        self.graph
    }

    /// Active camera id
    pub const fn camera_id(&self) -> NodeId {
        self.camera_id
    }

    /// Active camera
    pub const fn camera(&self) -> &'a Camera {
        self.camera
    }

    /// World-to-camera matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.camera_world.try_inverse().unwrap_or_else(Mat4::identity)
    }

    /// Camera projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        *self.camera.projection_matrix()
    }

    /// Combined projection * view matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Visible meshes with both slots bound, in scene traversal order
    pub fn draw_items(&self) -> Vec<DrawItem<'a>> {
        let mut items = Vec::new();
        self.walk(|id, object, world| {
            let Some(node) = object.as_node() else { return };
            let NodeRole::Mesh(slots) = &node.role else { return };

            let geometry = slots.geometry.and_then(|g| self.graph.object(g)).and_then(SceneObject::geometry);
            let material = slots.material.and_then(|m| self.graph.object(m)).and_then(SceneObject::material);
            if let (Some(geometry), Some(material)) = (geometry, material) {
                if material.visible {
                    items.push(DrawItem {
                        node: id,
                        world,
                        geometry,
                        material,
                        cast_shadow: node.cast_shadow,
                        receive_shadow: node.receive_shadow,
                    });
                }
            }
        });
        items
    }

    /// Visible lights, in scene traversal order
    pub fn lights(&self) -> Vec<LightItem<'a>> {
        let mut lights = Vec::new();
        self.walk(|id, object, world| {
            if let Some(light) = object.light() {
                let position = world.transform_point(&nalgebra::Point3::origin()).coords;
                let direction = world.transform_vector(&-Vec3::z());
                let direction = direction.try_normalize(f32::EPSILON).unwrap_or_else(|| -Vec3::z());
                lights.push(LightItem { node: id, position, direction, light });
            }
        });
        lights
    }

    /// Depth-first traversal of visible nodes under the mounted scenes
    fn walk(&self, mut visit: impl FnMut(NodeId, &'a SceneObject, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .graph
            .scenes()
            .iter()
            .rev()
            .map(|id| (*id, Mat4::identity()))
            .collect();

        // Bounded by the graph size so a malformed hierarchy cannot loop
        let mut budget = self.graph.len();
        while let Some((id, parent_world)) = stack.pop() {
            if budget == 0 {
                log::warn!("Frame traversal exceeded graph size, stopping");
                break;
            }
            budget -= 1;
            let Some(object) = self.graph.object(id) else { continue };
            let Some(node) = object.as_node() else { continue };
            if !node.visible {
                continue;
            }

            let world = parent_world * node.transform.to_matrix();
            visit(id, object, world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Kind, Op, PropValue};
    use crate::sync::OpApplier;
    use approx::assert_relative_eq;

    fn scene(extra: &[Op]) -> ObjectGraph {
        let mut ops = vec![
            Op::create(1, Kind::Scene),
            Op::create_with(2, Kind::Group, vec![("position", PropValue::vec3(1.0, 0.0, 0.0))]),
            Op::create_with(3, Kind::Mesh, vec![("position", PropValue::vec3(0.0, 2.0, 0.0))]),
            Op::create(4, Kind::BoxGeometry),
            Op::create(5, Kind::MeshBasicMaterial),
            Op::create(6, Kind::PerspectiveCamera),
            Op::create(7, Kind::PointLight),
            Op::attach(1, 2),
            Op::attach(2, 3),
            Op::attach(3, 4),
            Op::attach(3, 5),
            Op::attach(1, 6),
            Op::attach(2, 7),
            Op::set(6, "active", PropValue::bool(true)),
        ];
        ops.extend_from_slice(extra);
        let mut graph = ObjectGraph::new();
        OpApplier::apply_batch(&mut graph, &ops);
        graph
    }

    #[test]
    fn test_no_active_camera_means_no_frame() {
        let graph = scene(&[Op::unset(6, "active")]);
        assert!(FrameView::new(&graph).is_none());
    }

    #[test]
    fn test_world_matrices_compose_down_the_hierarchy() {
        let graph = scene(&[]);
        let frame = FrameView::new(&graph).unwrap();

        let items = frame.draw_items();
        assert_eq!(items.len(), 1);
        let origin = items[0].world.transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(origin.x, 1.0);
        assert_relative_eq!(origin.y, 2.0);

        let lights = frame.lights();
        assert_eq!(lights.len(), 1);
        assert_relative_eq!(lights[0].position.x, 1.0);
    }

    #[test]
    fn test_hidden_or_incomplete_meshes_are_skipped() {
        let hidden_group = scene(&[Op::set(2, "visible", PropValue::bool(false))]);
        let frame = FrameView::new(&hidden_group).unwrap();
        assert!(frame.draw_items().is_empty());
        assert!(frame.lights().is_empty());

        let hidden_material = scene(&[Op::set(5, "visible", PropValue::bool(false))]);
        assert!(FrameView::new(&hidden_material).unwrap().draw_items().is_empty());

        let no_geometry = scene(&[Op::detach(3, 4)]);
        assert!(FrameView::new(&no_geometry).unwrap().draw_items().is_empty());
    }

    #[test]
    fn test_unmounted_nodes_are_not_drawn() {
        let graph = scene(&[Op::detach(1, 2)]);
        let frame = FrameView::new(&graph).unwrap();
        assert!(frame.draw_items().is_empty());
        assert_eq!(frame.camera_id(), NodeId(6));
    }
}
