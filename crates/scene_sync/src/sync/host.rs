//! Per-surface scene host
//!
//! A [`SceneSync`] owns everything tied to one surface: the object graph, the
//! buffer of work received before the library resolved, the render loop and
//! the resize adapter.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──load ok──▶ Ready ──dispose──▶ Disposed
//!       │                                          ▲
//!       └──────────────── dispose ─────────────────┘
//! ```
//!
//! A failed load leaves the host `Uninitialized` for good: it keeps buffering
//! and never applies anything.

use std::rc::Rc;

use futures::FutureExt;

use crate::config::RenderLoopConfig;
use crate::loader::{LibraryLoader, LoadError, SharedLoad};
use crate::protocol::{NodeDescriptor, Op};
use crate::render::{
    FrameOutcome, Library, RenderError, RenderLoop, Renderer, ResizeAdapter, ResizeOutcome, Surface,
    SurfaceId,
};
use crate::scene::ObjectGraph;

use super::{BatchReport, OpApplier, PendingState};

/// Host lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Waiting for the library; work is buffered
    Uninitialized,
    /// Renderer and scene exist; work is applied immediately
    Ready,
    /// Torn down; work is rejected
    Disposed,
}

/// What happened to a `reset` or `apply_ops` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Applied against the live graph
    Applied(BatchReport),
    /// Captured until the host becomes ready
    Buffered,
    /// The host is disposed, or the surface cannot host a scene
    Rejected,
}

/// Scene synchronization engine for one surface
pub struct SceneSync {
    surface: Rc<dyn Surface>,
    state: HostState,
    load: Option<SharedLoad>,
    load_failed: bool,
    autostart: bool,
    renderer: Option<Box<dyn Renderer>>,
    graph: Option<ObjectGraph>,
    pending: PendingState,
    render_loop: RenderLoop,
    resize: ResizeAdapter,
}

impl SceneSync {
    /// Create a host and request the library
    ///
    /// An already resolved library makes the host ready before this returns.
    pub fn new(surface: Rc<dyn Surface>, loader: &LibraryLoader, config: &RenderLoopConfig) -> Self {
        log::info!("Creating scene host for {}", surface.id());

        let mut host = Self {
            surface,
            state: HostState::Uninitialized,
            load: Some(loader.load()),
            load_failed: false,
            autostart: config.autostart,
            renderer: None,
            graph: None,
            pending: PendingState::new(),
            render_loop: RenderLoop::new(),
            resize: ResizeAdapter::new(),
        };
        host.poll_load();
        host
    }

    /// Surface this host draws into
    pub fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    /// Lifecycle state
    pub const fn state(&self) -> HostState {
        self.state
    }

    /// Whether the host applies work immediately
    pub fn is_ready(&self) -> bool {
        self.state == HostState::Ready
    }

    /// Whether the library (or renderer) could not be obtained
    pub const fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Live graph, once ready
    pub const fn graph(&self) -> Option<&ObjectGraph> {
        self.graph.as_ref()
    }

    /// Work buffered while not ready
    pub const fn pending(&self) -> &PendingState {
        &self.pending
    }

    /// Render loop state
    pub const fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Mutable render loop, for starting or stopping it by hand
    pub fn render_loop_mut(&mut self) -> &mut RenderLoop {
        &mut self.render_loop
    }

    /// Renderer, once ready
    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    /// Check the load without blocking
    ///
    /// Called by the frame driver; finishes initialization as soon as the
    /// shared load has resolved.
    pub fn poll_load(&mut self) -> HostState {
        if let Some(result) = self.load.clone().and_then(FutureExt::now_or_never) {
            self.finish_load(result);
        }
        self.state
    }

    /// Wait for the load and finish initialization
    pub async fn wait_ready(&mut self) -> HostState {
        if let Some(load) = self.load.clone() {
            let result = load.await;
            self.finish_load(result);
        }
        self.state
    }

    fn finish_load(&mut self, result: Result<Library, LoadError>) {
        self.load = None;
        if self.state != HostState::Uninitialized {
            return;
        }

        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(|library| self.initialize(&library).map_err(|e: RenderError| e.to_string()));

        if let Err(reason) = outcome {
            if !self.load_failed {
                log::warn!(
                    "Scene host for {} cannot render and will keep buffering: {}",
                    self.surface.id(),
                    reason
                );
            }
            self.load_failed = true;
        }
    }

    /// Build renderer and scene, then flush the buffered work once
    fn initialize(&mut self, library: &Library) -> Result<(), RenderError> {
        let mut renderer = library.create_renderer(self.surface.as_ref())?;
        let mut graph = ObjectGraph::new();

        if self.autostart {
            self.render_loop.start();
        }
        self.resize.attach(self.surface.as_ref(), renderer.as_mut(), &mut graph);

        self.renderer = Some(renderer);
        self.graph = Some(graph);
        self.state = HostState::Ready;
        log::info!("Scene host for {} ready ({})", self.surface.id(), library.name());

        let (root, ops) = self.pending.take();
        if root.is_some() || !ops.is_empty() {
            let mut report = BatchReport::default();
            if let Some(root) = root {
                report = report.combined(self.materialize(&root));
            }
            report = report.combined(self.apply_now(&ops));
            log::debug!(
                "Flushed buffered work for {}: {} applied, {} ignored",
                self.surface.id(),
                report.applied,
                report.ignored
            );
        }
        Ok(())
    }

    /// Replace the whole scene with `root`
    pub fn reset(&mut self, root: NodeDescriptor) -> ApplyOutcome {
        match self.state {
            HostState::Uninitialized => {
                self.pending.buffer_reset(root);
                ApplyOutcome::Buffered
            }
            HostState::Ready => ApplyOutcome::Applied(self.materialize(&root)),
            HostState::Disposed => ApplyOutcome::Rejected,
        }
    }

    /// Apply an ordered batch of ops
    pub fn apply_ops(&mut self, ops: &[Op]) -> ApplyOutcome {
        match self.state {
            HostState::Uninitialized => {
                self.pending.buffer_ops(ops);
                ApplyOutcome::Buffered
            }
            HostState::Ready => ApplyOutcome::Applied(self.apply_now(ops)),
            HostState::Disposed => ApplyOutcome::Rejected,
        }
    }

    fn materialize(&mut self, root: &NodeDescriptor) -> BatchReport {
        let Some(graph) = self.graph.as_mut() else {
            return BatchReport::default();
        };
        graph.clear();
        let report = OpApplier::materialize(graph, root);
        self.release_disposed();
        // A rebuilt scene takes its camera aspect from the current surface
        self.handle_resize();
        report
    }

    fn apply_now(&mut self, ops: &[Op]) -> BatchReport {
        let Some(graph) = self.graph.as_mut() else {
            return BatchReport::default();
        };
        let report = OpApplier::apply_batch(graph, ops);
        self.release_disposed();
        report
    }

    /// Hand disposed geometry and material resources to the renderer
    fn release_disposed(&mut self) {
        let (Some(graph), Some(renderer)) = (self.graph.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        for handle in graph.take_released() {
            renderer.release(handle);
        }
    }

    /// Run one frame
    ///
    /// Polls a pending load first, so a frame driver alone is enough to bring
    /// the host up.
    pub fn step(&mut self) -> FrameOutcome {
        match self.state {
            HostState::Disposed => return FrameOutcome::Stopped,
            HostState::Uninitialized => {
                if self.poll_load() != HostState::Ready {
                    return FrameOutcome::Idle;
                }
            }
            HostState::Ready => {}
        }
        self.render_loop.step(self.renderer.as_deref_mut(), self.graph.as_ref())
    }

    /// Layout change notification from the platform
    pub fn handle_resize(&mut self) -> ResizeOutcome {
        let (Some(renderer), Some(graph)) = (self.renderer.as_mut(), self.graph.as_mut()) else {
            return ResizeOutcome::Skipped;
        };
        self.resize.apply(self.surface.as_ref(), renderer.as_mut(), graph)
    }

    /// Tear the host down; valid in any state
    pub fn dispose(&mut self) {
        if self.state == HostState::Disposed {
            return;
        }

        self.render_loop.stop();
        self.resize.detach(self.surface.as_ref());
        if let Some(graph) = self.graph.as_mut() {
            graph.clear();
        }
        self.release_disposed();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }

        self.graph = None;
        self.load = None;
        self.pending = PendingState::new();
        self.state = HostState::Disposed;
        log::info!("Scene host for {} disposed", self.surface.id());
    }
}

impl Drop for SceneSync {
    fn drop(&mut self) {
        self.dispose();
    }
}
