//! Closed set of supported properties
//!
//! Keys are partitioned by applicability. Decoding checks both the key and the
//! value shape, so appliers downstream only ever see well-typed properties.

use crate::foundation::math::Vec3;
use crate::scene::Color;

use super::{ApplyIssue, Kind, PropValue};

/// The only key `UnsetProp` acts on
pub const ACTIVE_KEY: &str = "active";

/// A decoded property
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// Applies to any object that has the member
    Universal(UniversalProp),
    /// Cameras only
    Camera(CameraProp),
    /// Geometry parameters; changing one rebuilds the geometry
    Geometry(GeometryProp),
    /// Material parameters
    Material(MaterialProp),
}

/// Properties shared across kinds
#[derive(Debug, Clone, PartialEq)]
pub enum UniversalProp {
    /// Local position
    Position(Vec3),
    /// Local rotation as XYZ Euler radians
    Rotation(Vec3),
    /// Local scale
    Scale(Vec3),
    /// Orient toward a point
    LookAt(Vec3),
    /// Visibility flag
    Visible(bool),
    /// Display name
    Name(String),
    /// Shadow casting flag
    CastShadow(bool),
    /// Shadow receiving flag
    ReceiveShadow(bool),
    /// Base color of lights and materials
    Color(Color),
    /// Light strength
    Intensity(f32),
}

/// Camera properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProp {
    /// Vertical field of view in degrees (perspective only)
    Fov(f32),
    /// Near clip plane
    Near(f32),
    /// Far clip plane
    Far(f32),
    /// Active camera selection
    Active(bool),
}

/// Geometry construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryProp {
    /// Box width
    Width(f32),
    /// Box height
    Height(f32),
    /// Box depth
    Depth(f32),
    /// Sphere radius
    Radius(f32),
    /// Sphere horizontal segments
    WidthSegments(f32),
    /// Sphere vertical segments
    HeightSegments(f32),
}

/// Material parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialProp {
    /// Metalness (standard material only)
    Metalness(f32),
    /// Roughness (standard material only)
    Roughness(f32),
    /// Wireframe rendering
    Wireframe(bool),
    /// Opacity; below 1 also marks the material transparent
    Opacity(f32),
}

impl Prop {
    /// Validate a key/value pair
    pub fn decode(key: &str, value: &PropValue) -> Result<Self, ApplyIssue> {
        let prop = match key {
            "position" => Self::Universal(UniversalProp::Position(expect_vec3(key, value)?)),
            "rotation" => Self::Universal(UniversalProp::Rotation(expect_vec3(key, value)?)),
            "scale" => Self::Universal(UniversalProp::Scale(expect_vec3(key, value)?)),
            "lookAt" => Self::Universal(UniversalProp::LookAt(expect_vec3(key, value)?)),
            "visible" => Self::Universal(UniversalProp::Visible(expect_bool(key, value)?)),
            "name" => Self::Universal(UniversalProp::Name(expect_string(key, value)?)),
            "castShadow" => Self::Universal(UniversalProp::CastShadow(expect_bool(key, value)?)),
            "receiveShadow" => Self::Universal(UniversalProp::ReceiveShadow(expect_bool(key, value)?)),
            "color" => Self::Universal(UniversalProp::Color(expect_color(key, value)?)),
            "intensity" => Self::Universal(UniversalProp::Intensity(expect_number(key, value)?)),

            "fov" => Self::Camera(CameraProp::Fov(expect_number(key, value)?)),
            "near" => Self::Camera(CameraProp::Near(expect_number(key, value)?)),
            "far" => Self::Camera(CameraProp::Far(expect_number(key, value)?)),
            ACTIVE_KEY => Self::Camera(CameraProp::Active(expect_bool(key, value)?)),

            "width" => Self::Geometry(GeometryProp::Width(expect_number(key, value)?)),
            "height" => Self::Geometry(GeometryProp::Height(expect_number(key, value)?)),
            "depth" => Self::Geometry(GeometryProp::Depth(expect_number(key, value)?)),
            "radius" => Self::Geometry(GeometryProp::Radius(expect_number(key, value)?)),
            "widthSegments" => Self::Geometry(GeometryProp::WidthSegments(expect_number(key, value)?)),
            "heightSegments" => Self::Geometry(GeometryProp::HeightSegments(expect_number(key, value)?)),

            "metalness" => Self::Material(MaterialProp::Metalness(expect_number(key, value)?)),
            "roughness" => Self::Material(MaterialProp::Roughness(expect_number(key, value)?)),
            "wireframe" => Self::Material(MaterialProp::Wireframe(expect_bool(key, value)?)),
            "opacity" => Self::Material(MaterialProp::Opacity(expect_number(key, value)?)),

            _ => {
                return Err(ApplyIssue::UnsupportedProp {
                    key: key.to_string(),
                    kind: Kind::Unsupported,
                })
            }
        };
        Ok(prop)
    }
}

fn mismatch(key: &str, expected: &'static str, value: &PropValue) -> ApplyIssue {
    ApplyIssue::TypeMismatch {
        key: key.to_string(),
        expected,
        found: value.type_name(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn expect_number(key: &str, value: &PropValue) -> Result<f32, ApplyIssue> {
    match value {
        PropValue::Number { value } => Ok(*value as f32),
        other => Err(mismatch(key, "number", other)),
    }
}

fn expect_bool(key: &str, value: &PropValue) -> Result<bool, ApplyIssue> {
    match value {
        PropValue::Bool { value } => Ok(*value),
        other => Err(mismatch(key, "bool", other)),
    }
}

fn expect_string(key: &str, value: &PropValue) -> Result<String, ApplyIssue> {
    match value {
        PropValue::String { value } => Ok(value.clone()),
        other => Err(mismatch(key, "string", other)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn expect_vec3(key: &str, value: &PropValue) -> Result<Vec3, ApplyIssue> {
    match value {
        PropValue::Vec3 { x, y, z } => Ok(Vec3::new(*x as f32, *y as f32, *z as f32)),
        other => Err(mismatch(key, "vec3", other)),
    }
}

fn expect_color(key: &str, value: &PropValue) -> Result<Color, ApplyIssue> {
    match value {
        PropValue::Color { r, g, b, .. } => Ok(Color::from_rgb8(*r, *g, *b)),
        other => Err(mismatch(key, "color", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_partitions_keys() {
        assert!(matches!(
            Prop::decode("position", &PropValue::vec3(1.0, 2.0, 3.0)),
            Ok(Prop::Universal(UniversalProp::Position(_)))
        ));
        assert_eq!(
            Prop::decode("fov", &PropValue::number(60.0)),
            Ok(Prop::Camera(CameraProp::Fov(60.0)))
        );
        assert_eq!(
            Prop::decode("width", &PropValue::number(2.0)),
            Ok(Prop::Geometry(GeometryProp::Width(2.0)))
        );
        assert_eq!(
            Prop::decode("opacity", &PropValue::number(0.5)),
            Ok(Prop::Material(MaterialProp::Opacity(0.5)))
        );
    }

    #[test]
    fn test_wrong_value_shape_is_a_type_mismatch() {
        let issue = Prop::decode("visible", &PropValue::number(1.0)).unwrap_err();
        assert_eq!(
            issue,
            ApplyIssue::TypeMismatch { key: "visible".into(), expected: "bool", found: "number" }
        );
    }

    #[test]
    fn test_unknown_key_is_unsupported() {
        let issue = Prop::decode("emissive", &PropValue::color(1, 2, 3)).unwrap_err();
        assert!(matches!(issue, ApplyIssue::UnsupportedProp { .. }));
    }

    #[test]
    fn test_color_channels_are_normalized() {
        let Ok(Prop::Universal(UniversalProp::Color(color))) =
            Prop::decode("color", &PropValue::color(255, 0, 51))
        else {
            panic!("color did not decode");
        };
        assert_eq!(color, Color::new(1.0, 0.0, 0.2));
    }
}
