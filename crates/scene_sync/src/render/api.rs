//! Backend abstraction traits for the rendering system
//!
//! This module defines the traits that a rendering library and its renderers
//! must implement, plus the surface they draw into.

use std::fmt;
use std::sync::Arc;

use crate::scene::ResourceHandle;

use super::FrameView;

/// Identity of a rendering surface, used as the registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// A drawable surface with a layout box
///
/// Implemented by the platform layer. Layout changes are delivered by the
/// platform calling back into the host; `observe_layout` and
/// `unobserve_layout` only toggle that subscription.
pub trait Surface {
    /// Stable identity of this surface
    fn id(&self) -> SurfaceId;

    /// Whether this element can host a renderer at all
    fn is_graphics_surface(&self) -> bool {
        true
    }

    /// Current client width and height in layout pixels
    fn client_size(&self) -> (u32, u32);

    /// Start delivering layout change notifications
    fn observe_layout(&self) {}

    /// Stop delivering layout change notifications
    fn unobserve_layout(&self) {}
}

/// Rendering errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The surface cannot be drawn into
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The backend failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// The renderer was already disposed
    #[error("Renderer disposed")]
    Disposed,
}

/// The underlying rendering library
///
/// Resolved once per process and shared read-only by every host.
pub trait RenderLibrary: Send + Sync {
    /// Human-readable library name, for logs
    fn name(&self) -> &str;

    /// Create a renderer bound to a surface
    fn create_renderer(&self, surface: &dyn Surface) -> Result<Box<dyn Renderer>, RenderError>;
}

/// Shared handle to the resolved library
pub type Library = Arc<dyn RenderLibrary>;

/// Per-surface renderer created by a [`RenderLibrary`]
pub trait Renderer {
    /// Resize the output without changing pixel density
    fn set_size(&mut self, width: u32, height: u32);

    /// Current output size
    fn size(&self) -> (u32, u32);

    /// Device pixels per layout pixel
    fn pixel_ratio(&self) -> f32;

    /// Draw one frame
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;

    /// Free resources tied to a disposed geometry or material
    fn release(&mut self, _resource: ResourceHandle) {}

    /// Release everything; the renderer is not used afterwards
    fn dispose(&mut self);
}
