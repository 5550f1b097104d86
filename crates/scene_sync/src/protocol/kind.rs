//! Node kinds and their structural category

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag carried by every created node
///
/// Unrecognized kind names deserialize to [`Kind::Unsupported`], which the
/// applier ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    /// Top-level scene container
    Scene,
    /// Plain grouping node
    Group,
    /// Renderable node with geometry and material slots
    Mesh,
    /// Camera with a perspective projection
    PerspectiveCamera,
    /// Camera with an orthographic projection
    OrthographicCamera,
    /// Axis-aligned box geometry
    BoxGeometry,
    /// UV sphere geometry
    SphereGeometry,
    /// Physically based material
    MeshStandardMaterial,
    /// Unlit material
    MeshBasicMaterial,
    /// Uniform ambient light
    AmbientLight,
    /// Directional (sun-like) light
    DirectionalLight,
    /// Omnidirectional point light
    PointLight,
    /// Any kind this engine does not know how to build
    #[serde(other)]
    Unsupported,
}

/// Structural category of a kind
///
/// Decides how a node participates in `Attach`/`Detach`: geometry and material
/// nodes bind into a mesh's slots, everything else forms generic scene-graph
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Binds into a mesh's geometry slot
    GeometryLike,
    /// Binds into a mesh's material slot
    MaterialLike,
    /// Ordinary scene-graph node
    Generic,
}

impl Kind {
    /// Every kind the engine can materialize
    pub const SUPPORTED: [Kind; 12] = [
        Kind::Scene,
        Kind::Group,
        Kind::Mesh,
        Kind::PerspectiveCamera,
        Kind::OrthographicCamera,
        Kind::BoxGeometry,
        Kind::SphereGeometry,
        Kind::MeshStandardMaterial,
        Kind::MeshBasicMaterial,
        Kind::AmbientLight,
        Kind::DirectionalLight,
        Kind::PointLight,
    ];

    /// Structural category of this kind
    pub const fn category(self) -> Category {
        match self {
            Kind::BoxGeometry | Kind::SphereGeometry => Category::GeometryLike,
            Kind::MeshStandardMaterial | Kind::MeshBasicMaterial => Category::MaterialLike,
            _ => Category::Generic,
        }
    }

    /// Whether this kind is a camera
    pub const fn is_camera(self) -> bool {
        matches!(self, Kind::PerspectiveCamera | Kind::OrthographicCamera)
    }

    /// Whether this kind is a light
    pub const fn is_light(self) -> bool {
        matches!(self, Kind::AmbientLight | Kind::DirectionalLight | Kind::PointLight)
    }

    /// Whether the engine can build an object for this kind
    pub const fn is_supported(self) -> bool {
        !matches!(self, Kind::Unsupported)
    }

    /// Name used on the wire
    pub const fn wire_name(self) -> &'static str {
        match self {
            Kind::Scene => "scene",
            Kind::Group => "group",
            Kind::Mesh => "mesh",
            Kind::PerspectiveCamera => "perspectiveCamera",
            Kind::OrthographicCamera => "orthographicCamera",
            Kind::BoxGeometry => "boxGeometry",
            Kind::SphereGeometry => "sphereGeometry",
            Kind::MeshStandardMaterial => "meshStandardMaterial",
            Kind::MeshBasicMaterial => "meshBasicMaterial",
            Kind::AmbientLight => "ambientLight",
            Kind::DirectionalLight => "directionalLight",
            Kind::PointLight => "pointLight",
            Kind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
