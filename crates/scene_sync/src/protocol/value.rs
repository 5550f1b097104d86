//! Typed property value envelope

use serde::{Deserialize, Serialize};

/// Value carried by `SetProp` and by the props of `Create`/`NodeDescriptor`
///
/// Tagged on `type` on the wire: `number`, `bool`, `string`, `vec3`, `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropValue {
    /// Scalar number
    Number {
        /// The value
        value: f64,
    },
    /// Boolean flag
    Bool {
        /// The value
        value: bool,
    },
    /// Text
    String {
        /// The value
        value: String,
    },
    /// Three-component vector
    Vec3 {
        /// X component
        x: f64,
        /// Y component
        y: f64,
        /// Z component
        z: f64,
    },
    /// RGBA color with 0-255 channels
    Color {
        /// Red channel
        r: i32,
        /// Green channel
        g: i32,
        /// Blue channel
        b: i32,
        /// Alpha channel
        #[serde(default = "opaque_alpha")]
        a: i32,
    },
}

const fn opaque_alpha() -> i32 {
    255
}

impl PropValue {
    /// Number value
    pub const fn number(value: f64) -> Self {
        Self::Number { value }
    }

    /// Boolean value
    pub const fn bool(value: bool) -> Self {
        Self::Bool { value }
    }

    /// String value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String { value: value.into() }
    }

    /// Vector value
    pub const fn vec3(x: f64, y: f64, z: f64) -> Self {
        Self::Vec3 { x, y, z }
    }

    /// Opaque color value
    pub const fn color(r: i32, g: i32, b: i32) -> Self {
        Self::Color { r, g, b, a: 255 }
    }

    /// Name of the wire type, for diagnostics
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Bool { .. } => "bool",
            Self::String { .. } => "string",
            Self::Vec3 { .. } => "vec3",
            Self::Color { .. } => "color",
        }
    }
}
