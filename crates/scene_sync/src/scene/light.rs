//! Light sources

use super::Color;

/// Type of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light from every direction, position is irrelevant
    Ambient,
    /// Parallel rays along the node's orientation (like sunlight)
    Directional,
    /// Light radiating in all directions from the node's position
    Point,
}

/// Light attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Type of light
    pub kind: LightKind,
    /// Light color
    pub color: Color,
    /// Light strength
    pub intensity: f32,
}

impl Light {
    /// White light of unit intensity
    pub const fn new(kind: LightKind) -> Self {
        Self { kind, color: Color::WHITE, intensity: 1.0 }
    }
}
