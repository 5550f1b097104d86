//! Normalized RGB color

/// Linear RGB color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color {
    /// White
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color from normalized channels
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 0-255 channels, clamping out-of-range input
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rgb8(r: i32, g: i32, b: i32) -> Self {
        let channel = |c: i32| c.clamp(0, 255) as f32 / 255.0;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Channels as an array
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
