//! # Scene cameras
//!
//! Perspective and orthographic cameras with a cached projection matrix.
//! Position and orientation live on the owning node's transform; the view
//! matrix is the inverse of that node's world matrix.
//!
//! ## Design Principles
//! - **Explicit recompute**: changing fov/aspect/clip planes only takes effect
//!   once [`Camera::update_projection_matrix`] runs, matching how remote
//!   updates are applied (set field, then recompute)
//! - **Never panics on remote input**: degenerate parameters keep the previous
//!   matrix instead of producing NaNs

use crate::foundation::math::{Mat4, utils};

/// Default vertical field of view in degrees
pub const DEFAULT_FOV_DEGREES: f32 = 50.0;

/// Default near clip plane
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far clip plane
pub const DEFAULT_FAR: f32 = 2000.0;

/// Tolerance for degenerate projection parameters
const PROJECTION_EPSILON: f32 = 1.0e-6;

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        fov: f32,
        /// Width / height
        aspect: f32,
    },
    /// Orthographic projection with a fixed view volume
    Orthographic {
        /// Left plane
        left: f32,
        /// Right plane
        right: f32,
        /// Top plane
        top: f32,
        /// Bottom plane
        bottom: f32,
    },
}

/// Camera attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Projection model and its parameters
    pub projection: Projection,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    projection_matrix: Mat4,
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane
    /// * `far` - Distance to far clipping plane
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            projection: Projection::Perspective { fov: fov_degrees, aspect },
            near,
            far,
            projection_matrix: Mat4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Create an orthographic camera
    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            projection: Projection::Orthographic { left, right, top, bottom },
            near,
            far,
            projection_matrix: Mat4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Default perspective camera: 50° fov, square aspect
    pub fn default_perspective() -> Self {
        Self::perspective(DEFAULT_FOV_DEGREES, 1.0, DEFAULT_NEAR, DEFAULT_FAR)
    }

    /// Default orthographic camera: unit view volume
    pub fn default_orthographic() -> Self {
        Self::orthographic(-1.0, 1.0, 1.0, -1.0, DEFAULT_NEAR, DEFAULT_FAR)
    }

    /// Whether this camera uses a perspective projection
    pub const fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// Vertical field of view in degrees, for perspective cameras
    pub const fn fov(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { fov, .. } => Some(fov),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Aspect ratio, for perspective cameras
    pub const fn aspect(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { aspect, .. } => Some(aspect),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Set the field of view; returns `false` for orthographic cameras
    pub fn set_fov(&mut self, fov_degrees: f32) -> bool {
        match &mut self.projection {
            Projection::Perspective { fov, .. } => {
                *fov = fov_degrees;
                true
            }
            Projection::Orthographic { .. } => false,
        }
    }

    /// Update the aspect ratio for viewport changes
    ///
    /// Returns `false` for orthographic cameras, which are not auto-adjusted.
    pub fn set_aspect_ratio(&mut self, new_aspect: f32) -> bool {
        match &mut self.projection {
            Projection::Perspective { aspect, .. } => {
                // Use a larger threshold to prevent spam during resize
                if (*aspect - new_aspect).abs() > 0.01 {
                    log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", aspect, new_aspect);
                }
                *aspect = new_aspect;
                true
            }
            Projection::Orthographic { .. } => false,
        }
    }

    /// Recompute the projection matrix from the current parameters
    ///
    /// Degenerate parameters (zero aspect, coincident clip planes, empty view
    /// volume) leave the previous matrix in place.
    pub fn update_projection_matrix(&mut self) {
        if (self.far - self.near).abs() <= PROJECTION_EPSILON {
            log::debug!("Ignoring projection update with near == far ({})", self.near);
            return;
        }

        match self.projection {
            Projection::Perspective { fov, aspect } => {
                if aspect.abs() <= PROJECTION_EPSILON || !aspect.is_finite() {
                    log::debug!("Ignoring projection update with aspect {aspect}");
                    return;
                }
                self.projection_matrix =
                    Mat4::new_perspective(aspect, utils::deg_to_rad(fov), self.near, self.far);
            }
            Projection::Orthographic { left, right, top, bottom } => {
                if (right - left).abs() <= PROJECTION_EPSILON
                    || (top - bottom).abs() <= PROJECTION_EPSILON
                {
                    log::debug!("Ignoring projection update with an empty orthographic volume");
                    return;
                }
                self.projection_matrix =
                    Mat4::new_orthographic(left, right, bottom, top, self.near, self.far);
            }
        }
    }

    /// Current projection matrix
    pub const fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_perspective_matches_nalgebra() {
        let camera = Camera::default_perspective();
        let expected = Mat4::new_perspective(1.0, utils::deg_to_rad(50.0), 0.1, 2000.0);
        assert_relative_eq!(*camera.projection_matrix(), expected);
    }

    #[test]
    fn test_aspect_change_requires_recompute() {
        let mut camera = Camera::default_perspective();
        let before = *camera.projection_matrix();

        assert!(camera.set_aspect_ratio(2.0));
        assert_eq!(*camera.projection_matrix(), before);

        camera.update_projection_matrix();
        assert_relative_eq!(camera.projection_matrix().m11, before.m11 / 2.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_orthographic_ignores_fov_and_aspect() {
        let mut camera = Camera::default_orthographic();
        assert!(!camera.set_fov(10.0));
        assert!(!camera.set_aspect_ratio(3.0));
        assert_eq!(camera.fov(), None);
    }

    #[test]
    fn test_degenerate_clip_planes_keep_previous_matrix() {
        let mut camera = Camera::default_perspective();
        let before = *camera.projection_matrix();
        camera.near = 5.0;
        camera.far = 5.0;
        camera.update_projection_matrix();
        assert_eq!(*camera.projection_matrix(), before);
    }
}
