//! Cooperative per-frame driver
//!
//! The loop owns no scheduler. An external frame driver calls
//! [`RenderLoop::step`] once per frame and keeps calling while the returned
//! [`FrameOutcome`] asks for another frame.

use crate::scene::ObjectGraph;

use super::{FrameView, Renderer};

/// Result of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The scene was drawn; schedule the next frame
    Rendered,
    /// Nothing to draw yet (no renderer, scene or active camera); schedule the next frame
    Idle,
    /// The loop is stopped; do not schedule further frames
    Stopped,
}

impl FrameOutcome {
    /// Whether the driver should schedule another frame
    pub const fn schedules_next(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Running flag plus frame statistics
#[derive(Debug, Default, Clone)]
pub struct RenderLoop {
    running: bool,
    frames_rendered: u64,
    frames_failed: u64,
}

impl RenderLoop {
    /// Create a stopped loop
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the loop; returns `false` if it was already running
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        log::debug!("Render loop started");
        true
    }

    /// Request a stop, observed at the next frame boundary
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Render loop stop requested");
        }
        self.running = false;
    }

    /// Whether the loop is running
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn so far
    pub const fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Frames whose draw call reported an error
    pub const fn frames_failed(&self) -> u64 {
        self.frames_failed
    }

    /// Run one frame
    ///
    /// Draws only when a renderer, a scene graph and an active camera are all
    /// present. A draw error is logged and does not stop the loop.
    pub fn step(
        &mut self,
        renderer: Option<&mut (dyn Renderer + '_)>,
        graph: Option<&ObjectGraph>,
    ) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }

        let (Some(renderer), Some(graph)) = (renderer, graph) else {
            return FrameOutcome::Idle;
        };
        let Some(frame) = FrameView::new(graph) else {
            log::trace!("No active camera, skipping frame");
            return FrameOutcome::Idle;
        };

        match renderer.render(&frame) {
            Ok(()) => {
                self.frames_rendered += 1;
                FrameOutcome::Rendered
            }
            Err(e) => {
                self.frames_failed += 1;
                log::warn!("Frame render failed: {}", e);
                FrameOutcome::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessRenderer;
    use crate::protocol::{Kind, NodeId};
    use crate::scene::SceneObject;

    fn graph_with_camera(active: bool) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let camera = SceneObject::new_default(Kind::PerspectiveCamera, || graph.allocate_handle()).unwrap();
        graph.insert(NodeId(1), Kind::PerspectiveCamera, camera).unwrap();
        if active {
            graph.set_active_camera(Some(NodeId(1)));
        }
        graph
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.start());
        assert!(!render_loop.start());
        assert!(render_loop.is_running());
    }

    #[test]
    fn test_stopped_loop_does_not_schedule() {
        let mut render_loop = RenderLoop::new();
        let mut renderer = HeadlessRenderer::new(1.0, (10, 10));
        let graph = graph_with_camera(true);

        assert_eq!(render_loop.step(Some(&mut renderer), Some(&graph)), FrameOutcome::Stopped);
        assert_eq!(renderer.stats().frames, 0);
    }

    #[test]
    fn test_draws_only_with_active_camera() {
        let mut render_loop = RenderLoop::new();
        render_loop.start();
        let mut renderer = HeadlessRenderer::new(1.0, (10, 10));

        let idle = graph_with_camera(false);
        assert_eq!(render_loop.step(Some(&mut renderer), Some(&idle)), FrameOutcome::Idle);
        assert_eq!(render_loop.step(None, Some(&idle)), FrameOutcome::Idle);

        let ready = graph_with_camera(true);
        assert_eq!(render_loop.step(Some(&mut renderer), Some(&ready)), FrameOutcome::Rendered);
        assert_eq!(renderer.stats().frames, 1);
        assert_eq!(renderer.stats().last_camera, Some(NodeId(1)));
    }

    #[test]
    fn test_stop_is_observed_at_next_step() {
        let mut render_loop = RenderLoop::new();
        render_loop.start();
        let mut renderer = HeadlessRenderer::new(1.0, (10, 10));
        let graph = graph_with_camera(true);

        assert!(render_loop.step(Some(&mut renderer), Some(&graph)).schedules_next());
        render_loop.stop();
        assert!(!render_loop.step(Some(&mut renderer), Some(&graph)).schedules_next());
        assert_eq!(render_loop.frames_rendered(), 1);
    }
}
