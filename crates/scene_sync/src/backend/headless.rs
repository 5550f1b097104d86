//! Headless rendering backend

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::loader::{LibraryHost, LoadError};
use crate::protocol::NodeId;
use crate::render::{FrameView, Library, RenderError, RenderLibrary, Renderer, Surface, SurfaceId};
use crate::scene::ResourceHandle;

/// What a headless renderer has been asked to do
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererStats {
    /// Frames drawn
    pub frames: u64,
    /// Camera used by the last frame
    pub last_camera: Option<NodeId>,
    /// Draw items in the last frame
    pub last_draw_items: usize,
    /// Lights in the last frame
    pub last_lights: usize,
    /// Current output size
    pub size: (u32, u32),
    /// Number of `set_size` calls
    pub resizes: u32,
    /// Handles released, in order
    pub released: Vec<ResourceHandle>,
    /// Whether `dispose` ran
    pub disposed: bool,
}

/// Renderer that records instead of drawing
#[derive(Debug)]
pub struct HeadlessRenderer {
    pixel_ratio: f32,
    stats: Arc<Mutex<RendererStats>>,
}

impl HeadlessRenderer {
    /// Create a renderer with a fixed pixel ratio and initial size
    pub fn new(pixel_ratio: f32, size: (u32, u32)) -> Self {
        let stats = RendererStats { size, ..RendererStats::default() };
        Self { pixel_ratio, stats: Arc::new(Mutex::new(stats)) }
    }

    /// Snapshot of the recorded activity
    pub fn stats(&self) -> RendererStats {
        self.stats.lock().clone()
    }

    fn shared_stats(&self) -> Arc<Mutex<RendererStats>> {
        Arc::clone(&self.stats)
    }
}

impl Renderer for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        let mut stats = self.stats.lock();
        stats.size = (width, height);
        stats.resizes += 1;
    }

    fn size(&self) -> (u32, u32) {
        self.stats.lock().size
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let mut stats = self.stats.lock();
        if stats.disposed {
            return Err(RenderError::Disposed);
        }
        stats.frames += 1;
        stats.last_camera = Some(frame.camera_id());
        stats.last_draw_items = frame.draw_items().len();
        stats.last_lights = frame.lights().len();
        log::trace!("Headless frame {} through camera {}", stats.frames, frame.camera_id());
        Ok(())
    }

    fn release(&mut self, resource: ResourceHandle) {
        self.stats.lock().released.push(resource);
    }

    fn dispose(&mut self) {
        self.stats.lock().disposed = true;
    }
}

/// Library that creates [`HeadlessRenderer`]s
#[derive(Debug)]
pub struct HeadlessLibrary {
    name: String,
    pixel_ratio: f32,
    refuse_renderers: AtomicBool,
    renderers: Mutex<Vec<Arc<Mutex<RendererStats>>>>,
}

impl HeadlessLibrary {
    /// Create a library with pixel ratio 1
    pub fn new() -> Self {
        Self {
            name: "headless".to_string(),
            pixel_ratio: 1.0,
            refuse_renderers: AtomicBool::new(false),
            renderers: Mutex::new(Vec::new()),
        }
    }

    /// Set the pixel ratio handed to new renderers
    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Make `create_renderer` fail from now on
    pub fn refuse_renderers(&self) {
        self.refuse_renderers.store(true, Ordering::SeqCst);
    }

    /// Number of renderers created so far
    pub fn renderer_count(&self) -> usize {
        self.renderers.lock().len()
    }

    /// Activity of the `index`-th renderer created
    pub fn renderer_stats(&self, index: usize) -> Option<RendererStats> {
        self.renderers.lock().get(index).map(|stats| stats.lock().clone())
    }

    /// Wrap into a shared [`Library`] handle
    pub fn into_library(self) -> Library {
        Arc::new(self)
    }
}

impl Default for HeadlessLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLibrary for HeadlessLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_renderer(&self, surface: &dyn Surface) -> Result<Box<dyn Renderer>, RenderError> {
        if self.refuse_renderers.load(Ordering::SeqCst) {
            return Err(RenderError::SurfaceUnavailable(surface.id().to_string()));
        }
        let renderer = HeadlessRenderer::new(self.pixel_ratio, surface.client_size());
        self.renderers.lock().push(renderer.shared_stats());
        Ok(Box::new(renderer))
    }
}

/// Surface with a scripted layout box
#[derive(Debug)]
pub struct HeadlessSurface {
    id: SurfaceId,
    graphics: bool,
    size: Cell<(u32, u32)>,
    observed: Cell<bool>,
}

impl HeadlessSurface {
    /// Graphics surface with the given client size
    pub const fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId(id),
            graphics: true,
            size: Cell::new((width, height)),
            observed: Cell::new(false),
        }
    }

    /// Element that is not a graphics surface
    pub const fn non_graphics(id: u64) -> Self {
        Self {
            id: SurfaceId(id),
            graphics: false,
            size: Cell::new((0, 0)),
            observed: Cell::new(false),
        }
    }

    /// Change the client size (the caller then notifies the host)
    pub fn set_client_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    /// Whether layout observation is active
    pub fn is_observed(&self) -> bool {
        self.observed.get()
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn is_graphics_surface(&self) -> bool {
        self.graphics
    }

    fn client_size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn observe_layout(&self) {
        self.observed.set(true);
    }

    fn unobserve_layout(&self) {
        self.observed.set(false);
    }
}

/// Scripted [`LibraryHost`]
///
/// Decides per source whether the library becomes available, and can hold the
/// module import open until [`StaticLibraryHost::open_gate`] is called.
pub struct StaticLibraryHost {
    library: Library,
    global: AtomicBool,
    module_resolves: bool,
    appearing_source: Option<String>,
    tags: Mutex<Vec<String>>,
    inserted: Mutex<Vec<String>>,
    imports: AtomicUsize,
    waits: AtomicUsize,
    gate: Mutex<Option<Shared<oneshot::Receiver<()>>>>,
    gate_sender: Mutex<Option<oneshot::Sender<()>>>,
}

impl StaticLibraryHost {
    /// A host where no source ever yields the library
    pub fn unavailable(library: Library) -> Self {
        Self {
            library,
            global: AtomicBool::new(false),
            module_resolves: false,
            appearing_source: None,
            tags: Mutex::new(Vec::new()),
            inserted: Mutex::new(Vec::new()),
            imports: AtomicUsize::new(0),
            waits: AtomicUsize::new(0),
            gate: Mutex::new(None),
            gate_sender: Mutex::new(None),
        }
    }

    /// A host where the module import succeeds
    pub fn with_module(library: Library) -> Self {
        Self { module_resolves: true, ..Self::unavailable(library) }
    }

    /// A host where the library is already globally available
    pub fn with_global(library: Library) -> Self {
        let host = Self::unavailable(library);
        host.global.store(true, Ordering::SeqCst);
        host
    }

    /// Make the library appear once `source` has been loaded
    pub fn appearing_after(mut self, source: impl Into<String>) -> Self {
        self.appearing_source = Some(source.into());
        self
    }

    /// Pretend a loader tag for `source` is already present
    pub fn with_existing_tag(self, source: impl Into<String>) -> Self {
        self.tags.lock().push(source.into());
        self
    }

    /// Hold module imports open until [`Self::open_gate`]
    pub fn gated(self) -> Self {
        let (sender, receiver) = oneshot::channel();
        *self.gate.lock() = Some(receiver.shared());
        *self.gate_sender.lock() = Some(sender);
        self
    }

    /// Release imports held by [`Self::gated`]
    pub fn open_gate(&self) {
        if let Some(sender) = self.gate_sender.lock().take() {
            let _ = sender.send(());
        }
    }

    /// Sources for which a new loader tag was inserted
    pub fn inserted_tags(&self) -> Vec<String> {
        self.inserted.lock().clone()
    }

    /// Number of module import attempts
    pub fn import_attempts(&self) -> usize {
        self.imports.load(Ordering::SeqCst)
    }

    /// Number of waits for global availability
    pub fn wait_attempts(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl LibraryHost for StaticLibraryHost {
    fn global_library(&self) -> Option<Library> {
        self.global.load(Ordering::SeqCst).then(|| Arc::clone(&self.library))
    }

    fn import_module(&self, url: &str) -> BoxFuture<'static, Result<Library, LoadError>> {
        self.imports.fetch_add(1, Ordering::SeqCst);
        let url = url.to_string();
        let library = self.module_resolves.then(|| Arc::clone(&self.library));
        let gate = self.gate.lock().clone();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            library.ok_or(LoadError::Import { url, reason: "module not reachable".to_string() })
        }
        .boxed()
    }

    fn has_loader_tag(&self, source: &str) -> bool {
        self.tags.lock().iter().any(|tag| tag == source)
    }

    fn insert_loader_tag(&self, source: &str) -> Result<(), LoadError> {
        self.tags.lock().push(source.to_string());
        self.inserted.lock().push(source.to_string());
        Ok(())
    }

    fn wait_for_global(&self, _timeout: Duration) -> BoxFuture<'static, Option<Library>> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        let loaded = self
            .appearing_source
            .as_deref()
            .is_some_and(|source| self.has_loader_tag(source));
        if loaded {
            self.global.store(true, Ordering::SeqCst);
        }
        let library = self.global_library();
        async move { library }.boxed()
    }
}
