//! Rendering seam
//!
//! The engine never draws by itself. A [`RenderLibrary`] (resolved once per
//! process by the [`crate::loader::LibraryLoader`]) creates one [`Renderer`]
//! per [`Surface`]; each frame the [`RenderLoop`] hands the renderer a
//! [`FrameView`] of the host's graph seen through the active camera, and the
//! [`ResizeAdapter`] keeps the renderer's output size in step with the surface.

mod api;
mod frame;
mod render_loop;
mod resize;

pub use api::{Surface, SurfaceId, RenderLibrary, Library, Renderer, RenderError};
pub use frame::{FrameView, DrawItem, LightItem};
pub use render_loop::{RenderLoop, FrameOutcome};
pub use resize::{ResizeAdapter, ResizeOutcome};
