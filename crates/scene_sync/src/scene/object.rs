//! Live scene objects

use crate::foundation::math::Transform;
use crate::protocol::{Kind, NodeId};

use super::{Camera, Geometry, GeometryShape, Light, LightKind, Material};

/// Opaque handle to renderer-side resources (vertex buffers, pipelines, ...)
///
/// Geometries and materials own one each. A rebuilt geometry gets a fresh
/// handle, so renderers can key their caches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub u64);

/// Geometry and material slots of a mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshSlots {
    /// Bound geometry node
    pub geometry: Option<NodeId>,
    /// Bound material node
    pub material: Option<NodeId>,
}

/// What a scene node is, beyond its transform
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    /// Scene container
    Scene,
    /// Group
    Group,
    /// Renderable mesh
    Mesh(MeshSlots),
    /// Camera
    Camera(Camera),
    /// Light
    Light(Light),
}

/// A node of the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Local transform
    pub transform: Transform,
    /// Visibility (hides the whole subtree)
    pub visible: bool,
    /// Shadow casting flag
    pub cast_shadow: bool,
    /// Shadow receiving flag
    pub receive_shadow: bool,
    /// Generic children in attach order
    pub children: Vec<NodeId>,
    /// Role-specific data
    pub role: NodeRole,
}

impl Node {
    fn new(role: NodeRole) -> Self {
        Self {
            transform: Transform::identity(),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
            role,
        }
    }

    /// Remove a generic child edge; returns whether it existed
    pub fn remove_child(&mut self, child: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != child);
        self.children.len() != before
    }

    /// Whether this node orients like a camera (-Z forward)
    pub const fn faces_negative_z(&self) -> bool {
        matches!(self.role, NodeRole::Camera(_) | NodeRole::Light(_))
    }
}

/// The object kinds the graph can hold
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectBody {
    /// Scene-graph node
    Node(Node),
    /// Geometry bound into mesh slots
    Geometry(Geometry),
    /// Material bound into mesh slots
    Material(Material),
}

/// A live engine object
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Display name
    pub name: String,
    /// Kind-specific data
    pub body: ObjectBody,
}

impl SceneObject {
    /// Build the default object for a kind
    ///
    /// `handle` is only consumed by kinds that own renderer resources. Returns
    /// `None` for [`Kind::Unsupported`].
    pub fn new_default(kind: Kind, handle: impl FnOnce() -> super::ResourceHandle) -> Option<Self> {
        let body = match kind {
            Kind::Scene => ObjectBody::Node(Node::new(NodeRole::Scene)),
            Kind::Group => ObjectBody::Node(Node::new(NodeRole::Group)),
            Kind::Mesh => ObjectBody::Node(Node::new(NodeRole::Mesh(MeshSlots::default()))),
            Kind::PerspectiveCamera => {
                ObjectBody::Node(Node::new(NodeRole::Camera(Camera::default_perspective())))
            }
            Kind::OrthographicCamera => {
                ObjectBody::Node(Node::new(NodeRole::Camera(Camera::default_orthographic())))
            }
            Kind::AmbientLight => ObjectBody::Node(Node::new(NodeRole::Light(Light::new(LightKind::Ambient)))),
            Kind::DirectionalLight => {
                ObjectBody::Node(Node::new(NodeRole::Light(Light::new(LightKind::Directional))))
            }
            Kind::PointLight => ObjectBody::Node(Node::new(NodeRole::Light(Light::new(LightKind::Point)))),
            Kind::BoxGeometry => ObjectBody::Geometry(Geometry::new(GeometryShape::default_box(), handle())),
            Kind::SphereGeometry => {
                ObjectBody::Geometry(Geometry::new(GeometryShape::default_sphere(), handle()))
            }
            Kind::MeshStandardMaterial => ObjectBody::Material(Material::standard(handle())),
            Kind::MeshBasicMaterial => ObjectBody::Material(Material::basic(handle())),
            Kind::Unsupported => return None,
        };

        Some(Self { name: String::new(), body })
    }

    /// Disposal hook: the renderer resources to release, if this kind owns any
    pub const fn disposable_handle(&self) -> Option<ResourceHandle> {
        match &self.body {
            ObjectBody::Geometry(geometry) => Some(geometry.handle()),
            ObjectBody::Material(material) => Some(material.handle()),
            ObjectBody::Node(_) => None,
        }
    }

    /// Scene node data
    pub const fn as_node(&self) -> Option<&Node> {
        match &self.body {
            ObjectBody::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Mutable scene node data
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match &mut self.body {
            ObjectBody::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Camera data
    pub const fn camera(&self) -> Option<&Camera> {
        match &self.body {
            ObjectBody::Node(Node { role: NodeRole::Camera(camera), .. }) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera data
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.body {
            ObjectBody::Node(Node { role: NodeRole::Camera(camera), .. }) => Some(camera),
            _ => None,
        }
    }

    /// Mesh slots
    pub const fn mesh_slots(&self) -> Option<&MeshSlots> {
        match &self.body {
            ObjectBody::Node(Node { role: NodeRole::Mesh(slots), .. }) => Some(slots),
            _ => None,
        }
    }

    /// Mutable mesh slots
    pub fn mesh_slots_mut(&mut self) -> Option<&mut MeshSlots> {
        match &mut self.body {
            ObjectBody::Node(Node { role: NodeRole::Mesh(slots), .. }) => Some(slots),
            _ => None,
        }
    }

    /// Light data
    pub const fn light(&self) -> Option<&Light> {
        match &self.body {
            ObjectBody::Node(Node { role: NodeRole::Light(light), .. }) => Some(light),
            _ => None,
        }
    }

    /// Mutable light data
    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.body {
            ObjectBody::Node(Node { role: NodeRole::Light(light), .. }) => Some(light),
            _ => None,
        }
    }

    /// Geometry data
    pub const fn geometry(&self) -> Option<&Geometry> {
        match &self.body {
            ObjectBody::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Material data
    pub const fn material(&self) -> Option<&Material> {
        match &self.body {
            ObjectBody::Material(material) => Some(material),
            _ => None,
        }
    }

    /// Mutable material data
    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.body {
            ObjectBody::Material(material) => Some(material),
            _ => None,
        }
    }
}
