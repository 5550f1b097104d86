//! Surface materials

use super::{Color, ResourceHandle};

/// Shading model of a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialModel {
    /// Physically based metallic/roughness shading
    Standard {
        /// Metalness factor (0.0 = dielectric, 1.0 = metallic)
        metalness: f32,
        /// Roughness factor (0.0 = mirror, 1.0 = fully rough)
        roughness: f32,
    },
    /// Unlit, flat color
    Basic,
}

/// Material bound into a mesh's material slot
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Shading model and its model-specific parameters
    pub model: MaterialModel,
    /// Base color
    pub color: Color,
    /// Render as wireframe
    pub wireframe: bool,
    /// Whether meshes using this material are drawn
    pub visible: bool,
    opacity: f32,
    transparent: bool,
    handle: ResourceHandle,
}

impl Material {
    /// Default standard material (white, non-metallic, fully rough)
    pub const fn standard(handle: ResourceHandle) -> Self {
        Self::with_model(MaterialModel::Standard { metalness: 0.0, roughness: 1.0 }, handle)
    }

    /// Default basic material (white)
    pub const fn basic(handle: ResourceHandle) -> Self {
        Self::with_model(MaterialModel::Basic, handle)
    }

    const fn with_model(model: MaterialModel, handle: ResourceHandle) -> Self {
        Self {
            model,
            color: Color::WHITE,
            wireframe: false,
            visible: true,
            opacity: 1.0,
            transparent: false,
            handle,
        }
    }

    /// Set opacity; the material becomes transparent exactly when opacity < 1
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
    }

    /// Opacity in `0.0..=1.0`
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether alpha blending is required
    pub const fn transparent(&self) -> bool {
        self.transparent
    }

    /// Set metalness; returns `false` when the model has none
    pub fn set_metalness(&mut self, value: f32) -> bool {
        match &mut self.model {
            MaterialModel::Standard { metalness, .. } => {
                *metalness = value;
                true
            }
            MaterialModel::Basic => false,
        }
    }

    /// Set roughness; returns `false` when the model has none
    pub fn set_roughness(&mut self, value: f32) -> bool {
        match &mut self.model {
            MaterialModel::Standard { roughness, .. } => {
                *roughness = value;
                true
            }
            MaterialModel::Basic => false,
        }
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
    fn test_opacity_drives_transparency() {
        let mut material = Material::basic(ResourceHandle(1));
        material.set_opacity(0.4);
        assert!(material.transparent());
        material.set_opacity(1.0);
        assert!(!material.transparent());
    }

    #[test]
    fn test_basic_material_has_no_pbr_parameters() {
        let mut material = Material::basic(ResourceHandle(1));
        assert!(!material.set_metalness(0.5));
        assert!(!material.set_roughness(0.5));
        assert_eq!(material.model, MaterialModel::Basic);
    }
}
