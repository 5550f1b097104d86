//! Keeps renderer output and camera projection in step with the surface

use crate::scene::ObjectGraph;

use super::{Renderer, Surface};

/// Result of one resize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Not observing, or the surface has a zero dimension (not laid out yet)
    Skipped,
    /// Renderer resized
    Resized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
}

/// Observes a surface's layout box
#[derive(Debug, Default, Clone)]
pub struct ResizeAdapter {
    observing: bool,
    last_size: Option<(u32, u32)>,
}

impl ResizeAdapter {
    /// Create a detached adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether layout observation is active
    pub const fn is_observing(&self) -> bool {
        self.observing
    }

    /// Size applied by the last successful pass
    pub const fn last_size(&self) -> Option<(u32, u32)> {
        self.last_size
    }

    /// Start observing and run the initial pass
    pub fn attach(
        &mut self,
        surface: &dyn Surface,
        renderer: &mut dyn Renderer,
        graph: &mut ObjectGraph,
    ) -> ResizeOutcome {
        if !self.observing {
            surface.observe_layout();
            self.observing = true;
        }
        self.apply(surface, renderer, graph)
    }

    /// Stop observing
    pub fn detach(&mut self, surface: &dyn Surface) {
        if self.observing {
            surface.unobserve_layout();
            self.observing = false;
        }
    }

    /// Handle one layout change notification
    ///
    /// A zero width or height means the surface is not visible or not sized
    /// yet; that is skipped, not an error. Only perspective cameras follow the
    /// new aspect ratio.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(
        &mut self,
        surface: &dyn Surface,
        renderer: &mut dyn Renderer,
        graph: &mut ObjectGraph,
    ) -> ResizeOutcome {
        if !self.observing {
            return ResizeOutcome::Skipped;
        }

        let (width, height) = surface.client_size();
        if width == 0 || height == 0 {
            log::trace!("{} has no layout size yet ({}x{})", surface.id(), width, height);
            return ResizeOutcome::Skipped;
        }

        renderer.set_size(width, height);
        self.last_size = Some((width, height));

        if let Some(camera) = graph
            .active_camera()
            .and_then(|id| graph.object_mut(id))
            .and_then(|object| object.camera_mut())
        {
            if camera.set_aspect_ratio(width as f32 / height as f32) {
                camera.update_projection_matrix();
            }
        }

        log::debug!("{} resized to {}x{}", surface.id(), width, height);
        ResizeOutcome::Resized { width, height }
    }
}
