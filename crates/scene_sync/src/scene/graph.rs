//! Identity-keyed object graph
//!
//! Holds the per-host tables:
//! - ObjectTable: id -> live [`SceneObject`]
//! - KindTable: id -> [`Kind`], kept apart from the object because kind drives
//!   attach and property semantics
//! - ParentTable: id -> parent id (at most one parent per id)
//! - ActiveCamera: at most one camera id
//!
//! An id is present in all three tables or in none of them. The graph only
//! offers table primitives; op semantics live in [`crate::sync::OpApplier`].

use std::collections::HashMap;

use crate::foundation::math::Mat4;
use crate::protocol::{Kind, NodeId};

use super::{ResourceHandle, SceneObject};

/// Guard against parent chains that somehow loop
const MAX_DEPTH: usize = 4096;

/// Tables owned by one host
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObjectGraph {
    objects: HashMap<NodeId, SceneObject>,
    kinds: HashMap<NodeId, Kind>,
    parents: HashMap<NodeId, Option<NodeId>>,
    active_camera: Option<NodeId>,
    /// Scene-kind nodes mounted under the host's scene root, in creation order
    scenes: Vec<NodeId>,
    released: Vec<ResourceHandle>,
    next_handle: u64,
}

impl ObjectGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the graph holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether `id` is live
    pub fn contains(&self, id: NodeId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Live ids, sorted
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Object for `id`
    pub fn object(&self, id: NodeId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Mutable object for `id`
    pub fn object_mut(&mut self, id: NodeId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Kind recorded for `id`
    pub fn kind(&self, id: NodeId) -> Option<Kind> {
        self.kinds.get(&id).copied()
    }

    /// Recorded parent of `id`; `None` when absent or parentless
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied().flatten()
    }

    /// Active camera id
    pub const fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// Scene nodes mounted under the host's scene root
    pub fn scenes(&self) -> &[NodeId] {
        &self.scenes
    }

    /// Allocate a handle for renderer-side resources
    ///
    /// Handles are per graph so replaying the same ops yields the same graph.
    pub fn allocate_handle(&mut self) -> ResourceHandle {
        self.next_handle += 1;
        ResourceHandle(self.next_handle)
    }

    /// Register a freshly built object in all three tables with no parent
    ///
    /// Scene-kind nodes are mounted under the host's scene root. Returns the
    /// object back when the id is already taken.
    pub fn insert(&mut self, id: NodeId, kind: Kind, object: SceneObject) -> Result<(), SceneObject> {
        if self.contains(id) {
            return Err(object);
        }

        self.objects.insert(id, object);
        self.kinds.insert(id, kind);
        self.parents.insert(id, None);
        if kind == Kind::Scene {
            self.scenes.push(id);
        }
        Ok(())
    }

    /// Remove `id` from all tables and run its disposal hook
    ///
    /// Clears ActiveCamera if it referenced `id`. Structural links must be
    /// undone by the caller beforehand.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneObject> {
        let object = self.objects.remove(&id)?;
        self.kinds.remove(&id);
        self.parents.remove(&id);
        self.scenes.retain(|s| *s != id);
        if self.active_camera == Some(id) {
            log::debug!("Active camera {} deleted", id);
            self.active_camera = None;
        }
        if let Some(handle) = object.disposable_handle() {
            self.released.push(handle);
        }
        Some(object)
    }

    /// Swap the object stored under `id`, disposing the previous one
    pub fn replace(&mut self, id: NodeId, object: SceneObject) -> Option<SceneObject> {
        let slot = self.objects.get_mut(&id)?;
        let previous = std::mem::replace(slot, object);
        if let Some(handle) = previous.disposable_handle() {
            self.released.push(handle);
        }
        Some(previous)
    }

    /// Record the parent of `id`
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(entry) = self.parents.get_mut(&id) {
            *entry = parent;
        }
    }

    /// Take a scene node off the host's scene root
    ///
    /// Used when a mounted scene is linked under another node.
    pub fn unmount_scene(&mut self, id: NodeId) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| *s != id);
        self.scenes.len() != before
    }

    /// Select the active camera
    pub fn set_active_camera(&mut self, camera: Option<NodeId>) {
        self.active_camera = camera;
    }

    /// Whether `ancestor` appears on the parent chain above `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        let mut depth = 0;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// World matrix of a node, composed down its parent chain
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut matrix = self.object(id)?.as_node()?.transform.to_matrix();
        let mut current = self.parent(id);
        let mut depth = 0;
        while let Some(parent) = current {
            let Some(node) = self.object(parent).and_then(SceneObject::as_node) else {
                break;
            };
            matrix = node.transform.to_matrix() * matrix;
            depth += 1;
            if depth > MAX_DEPTH {
                break;
            }
            current = self.parent(parent);
        }
        Some(matrix)
    }

    /// Drain handles released since the last call
    pub fn take_released(&mut self) -> Vec<ResourceHandle> {
        std::mem::take(&mut self.released)
    }

    /// Drop every object, running disposal hooks
    pub fn clear(&mut self) {
        let mut ids = self.ids();
        ids.reverse();
        for id in ids {
            self.remove(id);
        }
        self.scenes.clear();
        self.active_camera = None;
        log::debug!("Object graph cleared");
    }
}
