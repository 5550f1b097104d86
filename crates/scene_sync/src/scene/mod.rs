//! Engine-side scene objects
//!
//! These are the live objects the remote description is materialized into.
//! The [`ObjectGraph`] owns them together with the identity tables (kind,
//! parent, active camera) that the op applier mutates.
//!
//! ## Object model
//!
//! ```text
//! SceneObject
//!  ├─ Node      transform, flags, generic children, role
//!  │   └─ role: Scene | Group | Mesh{geometry, material} | Camera | Light
//!  ├─ Geometry  shape parameters + generated vertex buffers
//!  └─ Material  standard/basic surface parameters
//! ```

mod color;
mod camera;
mod light;
mod geometry;
mod material;
mod object;
mod graph;

pub use color::Color;
pub use camera::{Camera, Projection};
pub use light::{Light, LightKind};
pub use geometry::{Geometry, GeometryShape, Mesh, Vertex, MAX_SEGMENTS};
pub use material::{Material, MaterialModel};
pub use object::{SceneObject, ObjectBody, Node, NodeRole, MeshSlots, ResourceHandle};
pub use graph::ObjectGraph;
