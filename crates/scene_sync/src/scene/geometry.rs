//! Parametric geometries and their generated vertex buffers
//!
//! A geometry never changes shape in place: changing one parameter builds a
//! brand new [`Geometry`] from the previous parameters plus the changed one.

use std::f32::consts::PI;

use crate::protocol::GeometryProp;

use super::ResourceHandle;

/// Default box edge length
pub const DEFAULT_BOX_SIZE: f32 = 1.0;

/// Default sphere radius
pub const DEFAULT_SPHERE_RADIUS: f32 = 1.0;

/// Default sphere horizontal segments
pub const DEFAULT_WIDTH_SEGMENTS: u32 = 32;

/// Default sphere vertical segments
pub const DEFAULT_HEIGHT_SEGMENTS: u32 = 16;

const MIN_WIDTH_SEGMENTS: u32 = 3;
const MIN_HEIGHT_SEGMENTS: u32 = 2;

/// Upper bound on sphere segments along either direction
pub const MAX_SEGMENTS: u32 = 1024;

/// Vertex with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in object space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Vertex and triangle index buffers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub const fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles described by the index buffer
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Box centered at the origin with the given extents
    ///
    /// Each face has its own four vertices so normals stay flat per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

        // (normal, u axis, v axis) per face; corners are built from +/- u and v
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let half = [hx, hy, hz];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u_axis, v_axis) in faces {
            let base = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
            for (su, sv, uv) in [
                (-1.0, -1.0, [0.0, 0.0]),
                (1.0, -1.0, [1.0, 0.0]),
                (1.0, 1.0, [1.0, 1.0]),
                (-1.0, 1.0, [0.0, 1.0]),
            ] {
                let mut position = [0.0; 3];
                for axis in 0..3 {
                    position[axis] = (normal[axis] + su * u_axis[axis] + sv * v_axis[axis]) * half[axis];
                }
                vertices.push(Vertex::new(position, normal, uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(vertices, indices)
    }

    /// UV sphere centered at the origin
    ///
    /// Rows run from the north pole to the south pole; the degenerate triangles
    /// touching each pole are skipped. Segment counts are clamped to
    /// [`MAX_SEGMENTS`].
    #[allow(clippy::cast_precision_loss)]
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.clamp(MIN_WIDTH_SEGMENTS, MAX_SEGMENTS);
        let height_segments = height_segments.clamp(MIN_HEIGHT_SEGMENTS, MAX_SEGMENTS);

        let columns = width_segments as usize + 1;
        let capacity = columns.checked_mul(height_segments as usize + 1).unwrap_or(0);
        let mut vertices = Vec::with_capacity(capacity);
        let mut indices = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;

                let position = [
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ];
                let length = (position[0].powi(2) + position[1].powi(2) + position[2].powi(2)).sqrt();
                let normal = if length > 0.0 {
                    [position[0] / length, position[1] / length, position[2] / length]
                } else {
                    [0.0, 1.0, 0.0]
                };
                vertices.push(Vertex::new(position, normal, [u, 1.0 - v]));
            }
        }

        let index = |row: u32, column: u32| row * (width_segments + 1) + column;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = index(iy, ix + 1);
                let b = index(iy, ix);
                let c = index(iy + 1, ix);
                let d = index(iy + 1, ix + 1);
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }
}

/// Construction parameters of a geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryShape {
    /// Axis-aligned box
    Box {
        /// Extent along X
        width: f32,
        /// Extent along Y
        height: f32,
        /// Extent along Z
        depth: f32,
    },
    /// UV sphere
    Sphere {
        /// Radius
        radius: f32,
        /// Segments around the equator
        width_segments: u32,
        /// Segments from pole to pole
        height_segments: u32,
    },
}

impl GeometryShape {
    /// Unit box
    pub const fn default_box() -> Self {
        Self::Box { width: DEFAULT_BOX_SIZE, height: DEFAULT_BOX_SIZE, depth: DEFAULT_BOX_SIZE }
    }

    /// Unit sphere with default tessellation
    pub const fn default_sphere() -> Self {
        Self::Sphere {
            radius: DEFAULT_SPHERE_RADIUS,
            width_segments: DEFAULT_WIDTH_SEGMENTS,
            height_segments: DEFAULT_HEIGHT_SEGMENTS,
        }
    }

    /// Parameters after changing one of them
    ///
    /// Returns `None` when the parameter does not belong to this shape.
    pub fn with_param(self, prop: GeometryProp) -> Option<Self> {
        let shape = match (self, prop) {
            (Self::Box { height, depth, .. }, GeometryProp::Width(width))
            | (Self::Box { width, depth, .. }, GeometryProp::Height(height))
            | (Self::Box { width, height, .. }, GeometryProp::Depth(depth)) => {
                Self::Box { width, height, depth }
            }
            (Self::Sphere { width_segments, height_segments, .. }, GeometryProp::Radius(radius)) => {
                Self::Sphere { radius, width_segments, height_segments }
            }
            (Self::Sphere { radius, height_segments, .. }, GeometryProp::WidthSegments(segments)) => {
                Self::Sphere {
                    radius,
                    width_segments: segment_count(segments, MIN_WIDTH_SEGMENTS),
                    height_segments,
                }
            }
            (Self::Sphere { radius, width_segments, .. }, GeometryProp::HeightSegments(segments)) => {
                Self::Sphere {
                    radius,
                    width_segments,
                    height_segments: segment_count(segments, MIN_HEIGHT_SEGMENTS),
                }
            }
            _ => return None,
        };
        Some(shape)
    }

    fn build_mesh(self) -> Mesh {
        match self {
            Self::Box { width, height, depth } => Mesh::cuboid(width, height, depth),
            Self::Sphere { radius, width_segments, height_segments } => {
                Mesh::uv_sphere(radius, width_segments, height_segments)
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn segment_count(value: f32, minimum: u32) -> u32 {
    if value.is_finite() && value > 0.0 {
        (value.floor() as u32).clamp(minimum, MAX_SEGMENTS)
    } else {
        minimum
    }
}

/// Geometry object: parameters, generated buffers and a GPU resource handle
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    shape: GeometryShape,
    mesh: Mesh,
    handle: ResourceHandle,
}

impl Geometry {
    /// Build a geometry and its vertex buffers
    pub fn new(shape: GeometryShape, handle: ResourceHandle) -> Self {
        Self { shape, mesh: shape.build_mesh(), handle }
    }

    /// Construction parameters
    pub const fn shape(&self) -> GeometryShape {
        self.shape
    }

    /// Generated buffers
    pub const fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Renderer resource handle
    pub const fn handle(&self) -> ResourceHandle {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_extents_follow_dimensions() {
        let mesh = Mesh::cuboid(2.0, 1.0, 4.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        let max = mesh.vertices.iter().fold([0.0f32; 3], |acc, v| {
            [acc[0].max(v.position[0]), acc[1].max(v.position[1]), acc[2].max(v.position[2])]
        });
        assert_eq!(max, [1.0, 0.5, 2.0]);
    }

    #[test]
    fn test_uv_sphere_counts() {
        let mesh = Mesh::uv_sphere(1.0, 32, 16);
        assert_eq!(mesh.vertices.len(), 33 * 17);
        // Two triangles per quad, minus one per quad on each polar row
        assert_eq!(mesh.triangle_count(), 32 * 16 * 2 - 32 * 2);
    }

    #[test]
    fn test_box_param_change_keeps_other_dimensions() {
        let shape = GeometryShape::default_box().with_param(GeometryProp::Width(2.0));
        assert_eq!(shape, Some(GeometryShape::Box { width: 2.0, height: 1.0, depth: 1.0 }));
    }

    #[test]
    fn test_sphere_segments_are_floored_and_clamped() {
        let shape = GeometryShape::default_sphere()
            .with_param(GeometryProp::WidthSegments(7.9))
            .and_then(|s| s.with_param(GeometryProp::HeightSegments(1.0)));
        assert_eq!(
            shape,
            Some(GeometryShape::Sphere { radius: 1.0, width_segments: 7, height_segments: 2 })
        );
    }

    #[test]
    fn test_huge_segment_counts_are_capped() {
        let shape = GeometryShape::default_sphere()
            .with_param(GeometryProp::WidthSegments(4.0e9))
            .and_then(|s| s.with_param(GeometryProp::HeightSegments(f32::MAX)));
        assert_eq!(
            shape,
            Some(GeometryShape::Sphere {
                radius: 1.0,
                width_segments: MAX_SEGMENTS,
                height_segments: MAX_SEGMENTS,
            })
        );

        let mesh = Mesh::uv_sphere(1.0, u32::MAX, u32::MAX);
        let columns = MAX_SEGMENTS as usize + 1;
        assert_eq!(mesh.vertices.len(), columns * columns);
    }

    #[test]
    fn test_param_for_other_shape_is_rejected() {
        assert_eq!(GeometryShape::default_sphere().with_param(GeometryProp::Depth(3.0)), None);
        assert_eq!(GeometryShape::default_box().with_param(GeometryProp::Radius(3.0)), None);
    }
}
