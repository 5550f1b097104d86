//! Operation semantics over an [`ObjectGraph`]
//!
//! Every operation is applied against the current table state and either
//! takes effect or is ignored with an [`ApplyIssue`]. Issues are logged and
//! counted by the batch entry points; they never abort a batch.

use std::collections::VecDeque;

use crate::protocol::{
    ApplyIssue, CameraProp, Category, GeometryProp, Kind, MaterialProp, NodeDescriptor, NodeId, Op,
    Prop, PropValue, UniversalProp, ACTIVE_KEY,
};
use crate::scene::{Geometry, ObjectBody, ObjectGraph, SceneObject};

/// How many operations of a batch took effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Operations applied
    pub applied: usize,
    /// Operations ignored (unknown kind, missing reference, ...)
    pub ignored: usize,
}

impl BatchReport {
    /// Total operations seen
    pub const fn total(&self) -> usize {
        self.applied + self.ignored
    }

    fn record(&mut self, op: &str, result: Result<(), ApplyIssue>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(issue) => {
                log::debug!("Ignoring {}: {}", op, issue);
                self.ignored += 1;
            }
        }
    }

    /// Combine two reports
    pub const fn combined(self, other: Self) -> Self {
        Self {
            applied: self.applied + other.applied,
            ignored: self.ignored + other.ignored,
        }
    }
}

/// Maps operations onto graph mutations
///
/// Stateless: all state lives in the graph it is handed.
pub struct OpApplier;

impl OpApplier {
    /// Apply a batch strictly in order
    pub fn apply_batch(graph: &mut ObjectGraph, ops: &[Op]) -> BatchReport {
        let mut report = BatchReport::default();
        for op in ops {
            report.record(op.name(), Self::apply(graph, op));
        }
        report
    }

    /// Build a full tree breadth first
    ///
    /// Each node is created, then attached to its already materialized parent,
    /// then its children are queued. The caller clears the graph beforehand.
    pub fn materialize(graph: &mut ObjectGraph, root: &NodeDescriptor) -> BatchReport {
        let mut report = BatchReport::default();
        let mut queue: VecDeque<(&NodeDescriptor, Option<NodeId>)> = VecDeque::new();
        queue.push_back((root, None));

        while let Some((node, parent)) = queue.pop_front() {
            report.record("create", create(graph, node.id, node.kind, &node.props));
            if let Some(parent) = parent {
                report.record("attach", attach(graph, parent, node.id));
            }
            queue.extend(node.children.iter().map(|child| (child, Some(node.id))));
        }

        log::debug!(
            "Materialized {} nodes ({} steps ignored)",
            graph.len(),
            report.ignored
        );
        report
    }

    /// Apply one operation
    pub fn apply(graph: &mut ObjectGraph, op: &Op) -> Result<(), ApplyIssue> {
        match op {
            Op::Create { id, kind, props } => create(graph, *id, *kind, props),
            Op::Attach { parent_id, child_id } => attach(graph, *parent_id, *child_id),
            Op::Detach { parent_id, child_id } => detach(graph, *parent_id, *child_id),
            Op::SetProp { id, key, value } => set_prop(graph, *id, key, value),
            Op::UnsetProp { id, key } => unset_prop(graph, *id, key),
            Op::Delete { id } => delete(graph, *id),
        }
    }
}

fn require(graph: &ObjectGraph, id: NodeId) -> Result<Kind, ApplyIssue> {
    graph.kind(id).ok_or(ApplyIssue::MissingReference { id })
}

fn create(
    graph: &mut ObjectGraph,
    id: NodeId,
    kind: Kind,
    props: &[(String, PropValue)],
) -> Result<(), ApplyIssue> {
    if graph.contains(id) {
        return Err(ApplyIssue::DuplicateId { id });
    }
    let object = SceneObject::new_default(kind, || graph.allocate_handle())
        .ok_or(ApplyIssue::UnknownKind { id, kind })?;
    if graph.insert(id, kind, object).is_err() {
        return Err(ApplyIssue::DuplicateId { id });
    }

    for (key, value) in props {
        if let Err(issue) = set_prop(graph, id, key, value) {
            log::debug!("Create {}: ignoring prop: {}", id, issue);
        }
    }
    log::trace!("Created {} ({})", id, kind);
    Ok(())
}

fn attach(graph: &mut ObjectGraph, parent: NodeId, child: NodeId) -> Result<(), ApplyIssue> {
    let parent_kind = require(graph, parent)?;
    let child_kind = require(graph, child)?;
    let invalid = move |reason| ApplyIssue::InvalidStructure { parent, child, reason };

    if parent == child {
        return Err(invalid("a node cannot be its own child"));
    }

    match child_kind.category() {
        category @ (Category::GeometryLike | Category::MaterialLike) => {
            if parent_kind != Kind::Mesh {
                return Err(invalid("only meshes accept geometries and materials"));
            }
            unlink_from_parent(graph, child);

            let slots = graph
                .object_mut(parent)
                .and_then(SceneObject::mesh_slots_mut)
                .ok_or_else(|| invalid("mesh has no slots"))?;
            let slot = if category == Category::GeometryLike {
                &mut slots.geometry
            } else {
                &mut slots.material
            };
            let displaced = slot.replace(child);

            if let Some(previous) = displaced.filter(|previous| *previous != child) {
                graph.set_parent(previous, None);
            }
        }
        Category::Generic => {
            if graph.object(parent).and_then(SceneObject::as_node).is_none() {
                return Err(invalid("parent cannot hold scene children"));
            }
            if graph.is_ancestor(child, parent) {
                return Err(invalid("link would form a cycle"));
            }
            unlink_from_parent(graph, child);
            if child_kind == Kind::Scene {
                graph.unmount_scene(child);
            }

            if let Some(node) = graph.object_mut(parent).and_then(SceneObject::as_node_mut) {
                node.children.push(child);
            }
        }
    }

    graph.set_parent(child, Some(parent));
    log::trace!("Attached {} under {}", child, parent);
    Ok(())
}

/// Drop whatever edge currently holds `child`, keeping one parent per id
fn unlink_from_parent(graph: &mut ObjectGraph, child: NodeId) {
    if let Some(previous) = graph.parent(child) {
        if detach(graph, previous, child).is_err() {
            graph.set_parent(child, None);
        }
    }
}

fn detach(graph: &mut ObjectGraph, parent: NodeId, child: NodeId) -> Result<(), ApplyIssue> {
    require(graph, parent)?;
    let child_kind = require(graph, child)?;

    let Some(parent_object) = graph.object_mut(parent) else {
        return Err(ApplyIssue::MissingReference { id: parent });
    };

    let unlinked = match child_kind.category() {
        Category::GeometryLike => parent_object
            .mesh_slots_mut()
            .is_some_and(|slots| slots.geometry.take_if_eq(child)),
        Category::MaterialLike => parent_object
            .mesh_slots_mut()
            .is_some_and(|slots| slots.material.take_if_eq(child)),
        Category::Generic => parent_object
            .as_node_mut()
            .is_some_and(|node| node.remove_child(child)),
    };

    if graph.parent(child) == Some(parent) {
        graph.set_parent(child, None);
    } else if !unlinked {
        return Err(ApplyIssue::InvalidStructure {
            parent,
            child,
            reason: "not linked",
        });
    }

    log::trace!("Detached {} from {}", child, parent);
    Ok(())
}

trait TakeIfEq {
    fn take_if_eq(&mut self, id: NodeId) -> bool;
}

impl TakeIfEq for Option<NodeId> {
    fn take_if_eq(&mut self, id: NodeId) -> bool {
        if *self == Some(id) {
            *self = None;
            true
        } else {
            false
        }
    }
}

fn delete(graph: &mut ObjectGraph, id: NodeId) -> Result<(), ApplyIssue> {
    require(graph, id)?;

    if let Some(parent) = graph.parent(id) {
        if let Err(issue) = detach(graph, parent, id) {
            log::debug!("Delete {}: {}", id, issue);
            graph.set_parent(id, None);
        }
    }

    // Children survive as detached roots
    let mut orphans = Vec::new();
    if let Some(node) = graph.object_mut(id).and_then(SceneObject::as_node_mut) {
        orphans.append(&mut node.children);
    }
    if let Some(slots) = graph.object(id).and_then(SceneObject::mesh_slots) {
        orphans.extend(slots.geometry);
        orphans.extend(slots.material);
    }
    for orphan in orphans {
        if graph.parent(orphan) == Some(id) {
            graph.set_parent(orphan, None);
        }
    }

    graph.remove(id);
    log::trace!("Deleted {}", id);
    Ok(())
}

fn unset_prop(graph: &mut ObjectGraph, id: NodeId, key: &str) -> Result<(), ApplyIssue> {
    let kind = require(graph, id)?;
    if key != ACTIVE_KEY {
        return Err(ApplyIssue::UnsupportedProp { key: key.to_string(), kind });
    }
    if graph.active_camera() == Some(id) {
        graph.set_active_camera(None);
    }
    Ok(())
}

fn set_prop(graph: &mut ObjectGraph, id: NodeId, key: &str, value: &PropValue) -> Result<(), ApplyIssue> {
    let kind = require(graph, id)?;
    let unsupported = || ApplyIssue::UnsupportedProp { key: key.to_string(), kind };

    match Prop::decode(key, value)? {
        Prop::Universal(prop) => {
            let object = graph.object_mut(id).ok_or(ApplyIssue::MissingReference { id })?;
            set_universal(object, prop).then_some(()).ok_or_else(unsupported)
        }
        Prop::Camera(CameraProp::Active(active)) => {
            if !kind.is_camera() {
                return Err(unsupported());
            }
            if active {
                graph.set_active_camera(Some(id));
            } else if graph.active_camera() == Some(id) {
                graph.set_active_camera(None);
            }
            Ok(())
        }
        Prop::Camera(prop) => {
            let camera = graph
                .object_mut(id)
                .and_then(SceneObject::camera_mut)
                .ok_or_else(unsupported)?;
            let changed = match prop {
                CameraProp::Fov(fov) => camera.set_fov(fov),
                CameraProp::Near(near) => {
                    camera.near = near;
                    true
                }
                CameraProp::Far(far) => {
                    camera.far = far;
                    true
                }
                CameraProp::Active(_) => false,
            };
            if !changed {
                return Err(unsupported());
            }
            camera.update_projection_matrix();
            Ok(())
        }
        Prop::Geometry(prop) => rebuild_geometry(graph, id, prop).ok_or_else(unsupported),
        Prop::Material(prop) => {
            let material = graph
                .object_mut(id)
                .and_then(SceneObject::material_mut)
                .ok_or_else(unsupported)?;
            let applied = match prop {
                MaterialProp::Metalness(value) => material.set_metalness(value),
                MaterialProp::Roughness(value) => material.set_roughness(value),
                MaterialProp::Wireframe(wireframe) => {
                    material.wireframe = wireframe;
                    true
                }
                MaterialProp::Opacity(opacity) => {
                    material.set_opacity(opacity);
                    true
                }
            };
            applied.then_some(()).ok_or_else(unsupported)
        }
    }
}

/// Apply a universal property; `false` when the object has no such member
fn set_universal(object: &mut SceneObject, prop: UniversalProp) -> bool {
    match prop {
        UniversalProp::Name(name) => {
            object.name = name;
            return true;
        }
        UniversalProp::Visible(visible) => {
            if let Some(material) = object.material_mut() {
                material.visible = visible;
                return true;
            }
        }
        UniversalProp::Color(color) => {
            if let Some(material) = object.material_mut() {
                material.color = color;
                return true;
            }
            if let Some(light) = object.light_mut() {
                light.color = color;
                return true;
            }
            return false;
        }
        UniversalProp::Intensity(intensity) => {
            return object.light_mut().map(|light| light.intensity = intensity).is_some();
        }
        _ => {}
    }

    let Some(node) = object.as_node_mut() else {
        return false;
    };
    match prop {
        UniversalProp::Position(position) => node.transform.position = position,
        UniversalProp::Rotation(angles) => node.transform.set_euler_xyz(angles),
        UniversalProp::Scale(scale) => node.transform.scale = scale,
        UniversalProp::LookAt(target) => {
            let negative_z = node.faces_negative_z();
            if !node.transform.look_at(target, negative_z) {
                log::trace!("lookAt target coincides with position, rotation kept");
            }
        }
        UniversalProp::Visible(visible) => node.visible = visible,
        UniversalProp::CastShadow(flag) => node.cast_shadow = flag,
        UniversalProp::ReceiveShadow(flag) => node.receive_shadow = flag,
        UniversalProp::Name(_) | UniversalProp::Color(_) | UniversalProp::Intensity(_) => return false,
    }
    true
}

/// Build a new geometry from the changed parameter and the previous ones
///
/// The table entry is replaced and the old resources released. A mesh slot
/// refers to the id, so a bound mesh picks up the new geometry as is.
fn rebuild_geometry(graph: &mut ObjectGraph, id: NodeId, prop: GeometryProp) -> Option<()> {
    let object = graph.object(id)?;
    let shape = object.geometry()?.shape().with_param(prop)?;
    let name = object.name.clone();

    let handle = graph.allocate_handle();
    let rebuilt = SceneObject { name, body: ObjectBody::Geometry(Geometry::new(shape, handle)) };
    graph.replace(id, rebuilt)?;
    log::trace!("Rebuilt geometry {} as {:?}", id, shape);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PropValue;
    use crate::scene::{GeometryShape, MaterialModel, ResourceHandle, MAX_SEGMENTS};
    use approx::assert_relative_eq;

    fn graph_from(ops: &[Op]) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        OpApplier::apply_batch(&mut graph, ops);
        graph
    }

    fn mesh_setup() -> Vec<Op> {
        vec![
            Op::create(1, Kind::Scene),
            Op::create(2, Kind::Mesh),
            Op::create(3, Kind::BoxGeometry),
            Op::create(4, Kind::MeshStandardMaterial),
            Op::attach(1, 2),
            Op::attach(2, 3),
            Op::attach(2, 4),
        ]
    }

    #[test]
    fn test_create_registers_and_applies_props() {
        let graph = graph_from(&[Op::create_with(
            7,
            Kind::Group,
            vec![
                ("position", PropValue::vec3(1.0, 2.0, 3.0)),
                ("name", PropValue::string("pivot")),
            ],
        )]);

        let object = graph.object(NodeId(7)).unwrap();
        assert_eq!(object.name, "pivot");
        assert_relative_eq!(object.as_node().unwrap().transform.position.z, 3.0);
        assert_eq!(graph.kind(NodeId(7)), Some(Kind::Group));
        assert_eq!(graph.parent(NodeId(7)), None);
    }

    #[test]
    fn test_unknown_kind_creates_nothing() {
        let mut graph = ObjectGraph::new();
        let report = OpApplier::apply_batch(&mut graph, &[Op::create(1, Kind::Unsupported)]);

        assert_eq!(report, BatchReport { applied: 0, ignored: 1 });
        assert!(graph.is_empty());
        assert_eq!(graph.kind(NodeId(1)), None);
    }

    #[test]
    fn test_duplicate_create_keeps_first_object() {
        let mut graph = graph_from(&[Op::create(1, Kind::Group)]);
        let issue = OpApplier::apply(&mut graph, &Op::create(1, Kind::Mesh));

        assert_eq!(issue, Err(ApplyIssue::DuplicateId { id: NodeId(1) }));
        assert_eq!(graph.kind(NodeId(1)), Some(Kind::Group));
    }

    #[test]
    fn test_attach_and_detach_mesh_slots() {
        let mut graph = graph_from(&mesh_setup());

        let slots = *graph.object(NodeId(2)).unwrap().mesh_slots().unwrap();
        assert_eq!(slots.geometry, Some(NodeId(3)));
        assert_eq!(slots.material, Some(NodeId(4)));
        assert_eq!(graph.parent(NodeId(3)), Some(NodeId(2)));
        // Slot bindings are not scene children
        assert_eq!(graph.object(NodeId(2)).unwrap().as_node().unwrap().children, vec![]);

        OpApplier::apply(&mut graph, &Op::detach(2, 3)).unwrap();
        let slots = *graph.object(NodeId(2)).unwrap().mesh_slots().unwrap();
        assert_eq!(slots.geometry, None);
        assert_eq!(slots.material, Some(NodeId(4)));
        assert_eq!(graph.parent(NodeId(3)), None);
        assert!(graph.contains(NodeId(3)));
    }

    #[test]
    fn test_detach_leaves_slot_holding_other_object() {
        let mut ops = mesh_setup();
        ops.push(Op::create(5, Kind::SphereGeometry));
        ops.push(Op::attach(2, 5));
        let mut graph = graph_from(&ops);

        // 3 was displaced by 5 and lost its parent
        assert_eq!(graph.parent(NodeId(3)), None);
        assert!(OpApplier::apply(&mut graph, &Op::detach(2, 3)).is_err());

        let slots = graph.object(NodeId(2)).unwrap().mesh_slots().copied().unwrap();
        assert_eq!(slots.geometry, Some(NodeId(5)));
    }

    #[test]
    fn test_stale_detach_keeps_recorded_parent() {
        let mut graph = graph_from(&[
            Op::create(1, Kind::Group),
            Op::create(2, Kind::Group),
            Op::create(3, Kind::Group),
            Op::attach(1, 3),
        ]);

        assert!(OpApplier::apply(&mut graph, &Op::detach(2, 3)).is_err());
        assert_eq!(graph.parent(NodeId(3)), Some(NodeId(1)));
        assert_eq!(graph.object(NodeId(1)).unwrap().as_node().unwrap().children, vec![NodeId(3)]);
    }

    #[test]
    fn test_geometry_under_group_is_refused() {
        let mut graph = graph_from(&[Op::create(1, Kind::Group), Op::create(2, Kind::BoxGeometry)]);
        let issue = OpApplier::apply(&mut graph, &Op::attach(1, 2));

        assert!(matches!(issue, Err(ApplyIssue::InvalidStructure { .. })));
        assert_eq!(graph.parent(NodeId(2)), None);
    }

    #[test]
    fn test_attach_with_missing_ids_is_ignored() {
        let mut graph = graph_from(&[Op::create(1, Kind::Group)]);
        let report = OpApplier::apply_batch(&mut graph, &[Op::attach(1, 9), Op::attach(9, 1), Op::detach(1, 9)]);

        assert_eq!(report.ignored, 3);
        assert_eq!(graph.parent(NodeId(1)), None);
    }

    #[test]
    fn test_reparenting_keeps_single_parent() {
        let graph = graph_from(&[
            Op::create(1, Kind::Group),
            Op::create(2, Kind::Group),
            Op::create(3, Kind::Mesh),
            Op::attach(1, 3),
            Op::attach(2, 3),
        ]);

        assert_eq!(graph.parent(NodeId(3)), Some(NodeId(2)));
        assert!(graph.object(NodeId(1)).unwrap().as_node().unwrap().children.is_empty());
        assert_eq!(graph.object(NodeId(2)).unwrap().as_node().unwrap().children, vec![NodeId(3)]);
    }

    #[test]
    fn test_cycles_and_self_links_are_refused() {
        let mut graph = graph_from(&[
            Op::create(1, Kind::Group),
            Op::create(2, Kind::Group),
            Op::attach(1, 2),
        ]);

        assert!(OpApplier::apply(&mut graph, &Op::attach(2, 1)).is_err());
        assert!(OpApplier::apply(&mut graph, &Op::attach(1, 1)).is_err());
        assert_eq!(graph.parent(NodeId(1)), None);
        assert_eq!(graph.parent(NodeId(2)), Some(NodeId(1)));
    }

    #[test]
    fn test_delete_unlinks_from_parent_and_orphans_children() {
        let mut ops = mesh_setup();
        ops.push(Op::create(5, Kind::Group));
        ops.push(Op::attach(2, 5));
        let mut graph = graph_from(&ops);

        OpApplier::apply(&mut graph, &Op::delete(3)).unwrap();
        assert!(!graph.contains(NodeId(3)));
        assert_eq!(graph.kind(NodeId(3)), None);
        assert_eq!(graph.object(NodeId(2)).unwrap().mesh_slots().unwrap().geometry, None);
        assert_eq!(graph.take_released(), vec![ResourceHandle(1)]);

        OpApplier::apply(&mut graph, &Op::delete(2)).unwrap();
        assert!(graph.object(NodeId(1)).unwrap().as_node().unwrap().children.is_empty());
        assert_eq!(graph.parent(NodeId(4)), None);
        assert_eq!(graph.parent(NodeId(5)), None);
        assert!(graph.contains(NodeId(5)));
    }

    #[test]
    fn test_delete_missing_is_ignored() {
        let mut graph = ObjectGraph::new();
        assert_eq!(
            OpApplier::apply(&mut graph, &Op::delete(4)),
            Err(ApplyIssue::MissingReference { id: NodeId(4) })
        );
    }

    #[test]
    fn test_active_camera_is_exclusive() {
        let mut graph = graph_from(&[
            Op::create(1, Kind::PerspectiveCamera),
            Op::create(2, Kind::OrthographicCamera),
            Op::set(1, "active", PropValue::bool(true)),
            Op::set(2, "active", PropValue::bool(true)),
        ]);
        assert_eq!(graph.active_camera(), Some(NodeId(2)));

        // Stale deactivation from a camera that is no longer active
        OpApplier::apply(&mut graph, &Op::set(1, "active", PropValue::bool(false))).unwrap();
        assert_eq!(graph.active_camera(), Some(NodeId(2)));

        OpApplier::apply(&mut graph, &Op::unset(1, "active")).unwrap();
        assert_eq!(graph.active_camera(), Some(NodeId(2)));

        OpApplier::apply(&mut graph, &Op::unset(2, "active")).unwrap();
        assert_eq!(graph.active_camera(), None);
    }

    #[test]
    fn test_active_on_non_camera_is_ignored() {
        let mut graph = graph_from(&[Op::create(1, Kind::Mesh)]);
        assert!(OpApplier::apply(&mut graph, &Op::set(1, "active", PropValue::bool(true))).is_err());
        assert_eq!(graph.active_camera(), None);
    }

    #[test]
    fn test_deleting_active_camera_clears_selection() {
        let mut graph = graph_from(&[
            Op::create(1, Kind::PerspectiveCamera),
            Op::set(1, "active", PropValue::bool(true)),
        ]);
        OpApplier::apply(&mut graph, &Op::delete(1)).unwrap();
        assert_eq!(graph.active_camera(), None);
    }

    #[test]
    fn test_box_rebuild_preserves_untouched_dimensions() {
        let mut ops = mesh_setup();
        ops.push(Op::set(3, "width", PropValue::number(2.0)));
        let mut graph = graph_from(&ops);

        let geometry = graph.object(NodeId(3)).unwrap().geometry().unwrap();
        assert_eq!(geometry.shape(), GeometryShape::Box { width: 2.0, height: 1.0, depth: 1.0 });
        assert_ne!(geometry.handle(), ResourceHandle(1));
        assert_eq!(graph.take_released(), vec![ResourceHandle(1)]);
        assert_eq!(graph.object(NodeId(2)).unwrap().mesh_slots().unwrap().geometry, Some(NodeId(3)));
        assert_eq!(graph.parent(NodeId(3)), Some(NodeId(2)));
    }

    #[test]
    fn test_sphere_rebuild_and_wrong_shape_params() {
        let mut graph = graph_from(&[
            Op::create(1, Kind::SphereGeometry),
            Op::set(1, "heightSegments", PropValue::number(8.7)),
        ]);
        assert_eq!(
            graph.object(NodeId(1)).unwrap().geometry().unwrap().shape(),
            GeometryShape::Sphere { radius: 1.0, width_segments: 32, height_segments: 8 }
        );

        assert!(OpApplier::apply(&mut graph, &Op::set(1, "width", PropValue::number(3.0))).is_err());
    }

    #[test]
    fn test_huge_sphere_segments_are_capped() {
        let graph = graph_from(&[
            Op::create(1, Kind::SphereGeometry),
            Op::set(1, "widthSegments", PropValue::number(4.0e9)),
        ]);
        let geometry = graph.object(NodeId(1)).unwrap().geometry().unwrap();

        assert_eq!(
            geometry.shape(),
            GeometryShape::Sphere { radius: 1.0, width_segments: MAX_SEGMENTS, height_segments: 16 }
        );
        assert_eq!(geometry.mesh().vertices.len(), (MAX_SEGMENTS as usize + 1) * 17);
    }

    #[test]
    fn test_material_props() {
        let graph = graph_from(&[
            Op::create(1, Kind::MeshStandardMaterial),
            Op::set(1, "metalness", PropValue::number(0.5)),
            Op::set(1, "opacity", PropValue::number(0.25)),
            Op::set(1, "wireframe", PropValue::bool(true)),
            Op::set(1, "color", PropValue::color(255, 0, 0)),
        ]);
        let material = graph.object(NodeId(1)).unwrap().material().unwrap();

        assert_eq!(material.model, MaterialModel::Standard { metalness: 0.5, roughness: 1.0 });
        assert!(material.transparent());
        assert!(material.wireframe);
        assert_relative_eq!(material.color.r, 1.0);
        assert_relative_eq!(material.color.g, 0.0);

        let mut graph = graph;
        OpApplier::apply(&mut graph, &Op::set(1, "opacity", PropValue::number(1.0))).unwrap();
        assert!(!graph.object(NodeId(1)).unwrap().material().unwrap().transparent());
    }

    #[test]
    fn test_type_mismatch_is_ignored() {
        let mut graph = graph_from(&[Op::create(1, Kind::Group)]);
        let issue = OpApplier::apply(&mut graph, &Op::set(1, "position", PropValue::number(2.0)));

        assert!(matches!(issue, Err(ApplyIssue::TypeMismatch { .. })));
        assert_relative_eq!(graph.object(NodeId(1)).unwrap().as_node().unwrap().transform.position.x, 0.0);
    }

    #[test]
    fn test_camera_props_recompute_projection() {
        let mut graph = graph_from(&[Op::create(1, Kind::PerspectiveCamera)]);
        let before = *graph.object(NodeId(1)).unwrap().camera().unwrap().projection_matrix();

        OpApplier::apply(&mut graph, &Op::set(1, "fov", PropValue::number(75.0))).unwrap();
        OpApplier::apply(&mut graph, &Op::set(1, "far", PropValue::number(50.0))).unwrap();

        let camera = graph.object(NodeId(1)).unwrap().camera().unwrap();
        assert_eq!(camera.fov(), Some(75.0));
        assert_relative_eq!(camera.far, 50.0);
        assert_ne!(*camera.projection_matrix(), before);

        let mut ortho = graph_from(&[Op::create(2, Kind::OrthographicCamera)]);
        assert!(OpApplier::apply(&mut ortho, &Op::set(2, "fov", PropValue::number(75.0))).is_err());
    }

    #[test]
    fn test_light_props() {
        let graph = graph_from(&[
            Op::create(1, Kind::PointLight),
            Op::set(1, "intensity", PropValue::number(3.0)),
            Op::set(1, "color", PropValue::color(0, 0, 255)),
        ]);
        let light = graph.object(NodeId(1)).unwrap().light().unwrap();
        assert_relative_eq!(light.intensity, 3.0);
        assert_relative_eq!(light.color.b, 1.0);
    }

    #[test]
    fn test_intensity_on_mesh_is_ignored() {
        let mut graph = graph_from(&[Op::create(1, Kind::Mesh)]);
        let issue = OpApplier::apply(&mut graph, &Op::set(1, "intensity", PropValue::number(2.0)));
        assert_eq!(
            issue,
            Err(ApplyIssue::UnsupportedProp { key: "intensity".to_string(), kind: Kind::Mesh })
        );
    }

    #[test]
    fn test_materialize_is_breadth_first() {
        let root = NodeDescriptor::new(1, Kind::Scene)
            .with_child(
                NodeDescriptor::new(2, Kind::Mesh)
                    .with_child(NodeDescriptor::new(4, Kind::BoxGeometry))
                    .with_child(NodeDescriptor::new(5, Kind::MeshBasicMaterial)),
            )
            .with_child(
                NodeDescriptor::new(3, Kind::PerspectiveCamera).with_prop("active", PropValue::bool(true)),
            );

        let mut graph = ObjectGraph::new();
        let report = OpApplier::materialize(&mut graph, &root);

        assert_eq!(report, BatchReport { applied: 9, ignored: 0 });
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.scenes(), &[NodeId(1)]);
        assert_eq!(graph.active_camera(), Some(NodeId(3)));
        assert_eq!(graph.parent(NodeId(5)), Some(NodeId(2)));
        assert_eq!(graph.object(NodeId(1)).unwrap().as_node().unwrap().children, vec![NodeId(2), NodeId(3)]);
        // Handles follow creation order: 4 before 5
        assert_eq!(graph.object(NodeId(4)).unwrap().geometry().unwrap().handle(), ResourceHandle(1));
    }

    #[test]
    fn test_nested_scene_is_unmounted() {
        let graph = graph_from(&[Op::create(1, Kind::Scene), Op::create(2, Kind::Scene), Op::attach(1, 2)]);
        assert_eq!(graph.scenes(), &[NodeId(1)]);
    }

    #[test]
    fn test_batching_is_not_observable() {
        let mut ops = mesh_setup();
        ops.extend([
            Op::create(6, Kind::PerspectiveCamera),
            Op::attach(1, 6),
            Op::set(6, "active", PropValue::bool(true)),
            Op::set(3, "depth", PropValue::number(4.0)),
            Op::delete(4),
            Op::attach(2, 99),
        ]);

        let whole = graph_from(&ops);
        let mut split = ObjectGraph::new();
        for chunk in ops.chunks(3) {
            OpApplier::apply_batch(&mut split, chunk);
        }
        assert_eq!(whole, split);
    }
}
