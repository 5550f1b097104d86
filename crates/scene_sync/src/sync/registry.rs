//! Surface to host association
//!
//! Hosts are created on the first payload addressed to a surface and removed
//! only by an explicit [`SurfaceRegistry::dispose_host`]. A process-wide
//! instance lives in a thread-local slot filled by [`install`]; the free
//! functions in this module forward to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::{RenderLoopConfig, SyncConfig};
use crate::loader::{LibraryHost, LibraryLoader};
use crate::protocol::{NodeDescriptor, Op};
use crate::render::{FrameOutcome, ResizeOutcome, Surface, SurfaceId};

use super::{ApplyOutcome, SceneSync};

/// Table of live hosts keyed by surface
pub struct SurfaceRegistry {
    loader: LibraryLoader,
    render_config: RenderLoopConfig,
    hosts: HashMap<SurfaceId, SceneSync>,
}

impl SurfaceRegistry {
    /// Create an empty registry sharing `loader` across its hosts
    pub fn new(loader: LibraryLoader, render_config: RenderLoopConfig) -> Self {
        Self { loader, render_config, hosts: HashMap::new() }
    }

    /// Create a registry and its loader from configuration
    pub fn from_config(config: &SyncConfig, library_host: Arc<dyn LibraryHost>) -> Self {
        let loader = LibraryLoader::new(config.loader.clone(), library_host);
        Self::new(loader, config.render.clone())
    }

    /// Shared library loader
    pub const fn loader(&self) -> &LibraryLoader {
        &self.loader
    }

    /// Number of live hosts
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether no host exists
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Surfaces with a live host, sorted
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<SurfaceId> = self.hosts.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Host of a surface
    pub fn host(&self, id: SurfaceId) -> Option<&SceneSync> {
        self.hosts.get(&id)
    }

    /// Mutable host of a surface
    pub fn host_mut(&mut self, id: SurfaceId) -> Option<&mut SceneSync> {
        self.hosts.get_mut(&id)
    }

    /// Host of a surface, created on first reference
    ///
    /// Returns `None` when the element cannot host a scene.
    pub fn host_for(&mut self, surface: &Rc<dyn Surface>) -> Option<&mut SceneSync> {
        if !surface.is_graphics_surface() {
            log::debug!("{} is not a graphics surface", surface.id());
            return None;
        }
        let loader = &self.loader;
        let config = &self.render_config;
        Some(
            self.hosts
                .entry(surface.id())
                .or_insert_with(|| SceneSync::new(Rc::clone(surface), loader, config)),
        )
    }

    /// Replace the scene on `surface` with a full tree
    pub fn apply_scene_tree(&mut self, surface: &Rc<dyn Surface>, root: NodeDescriptor) -> ApplyOutcome {
        self.host_for(surface)
            .map_or(ApplyOutcome::Rejected, |host| host.reset(root))
    }

    /// Apply an ordered op batch to `surface`
    ///
    /// Does nothing for elements that are not graphics surfaces.
    pub fn apply_scene_patch(&mut self, surface: &Rc<dyn Surface>, ops: &[Op]) -> ApplyOutcome {
        self.host_for(surface)
            .map_or(ApplyOutcome::Rejected, |host| host.apply_ops(ops))
    }

    /// Dispose and forget the host of a surface
    pub fn dispose_host(&mut self, id: SurfaceId) -> bool {
        match self.hosts.remove(&id) {
            Some(mut host) => {
                host.dispose();
                true
            }
            None => false,
        }
    }

    /// Run one frame on every host
    ///
    /// Returns the hosts whose loop stopped, so a driver can stop scheduling them.
    pub fn pump_frame(&mut self) -> Vec<SurfaceId> {
        let mut stopped: Vec<SurfaceId> = self
            .hosts
            .iter_mut()
            .filter_map(|(id, host)| (host.step() == FrameOutcome::Stopped).then_some(*id))
            .collect();
        stopped.sort_unstable();
        stopped
    }

    /// Forward a layout change to the surface's host
    pub fn notify_resize(&mut self, id: SurfaceId) -> ResizeOutcome {
        self.hosts
            .get_mut(&id)
            .map_or(ResizeOutcome::Skipped, SceneSync::handle_resize)
    }

    /// Dispose every host
    pub fn clear(&mut self) {
        for (_, mut host) in self.hosts.drain() {
            host.dispose();
        }
    }
}

thread_local! {
    static REGISTRY: RefCell<Option<SurfaceRegistry>> = const { RefCell::new(None) };
}

/// Install the process registry, returning the one it replaces
pub fn install(registry: SurfaceRegistry) -> Option<SurfaceRegistry> {
    REGISTRY.with(|slot| slot.borrow_mut().replace(registry))
}

/// Remove the process registry
pub fn uninstall() -> Option<SurfaceRegistry> {
    REGISTRY.with(|slot| slot.borrow_mut().take())
}

/// Run `f` against the process registry
///
/// Returns `None` when no registry is installed or it is already borrowed.
pub fn with_registry<R>(f: impl FnOnce(&mut SurfaceRegistry) -> R) -> Option<R> {
    REGISTRY.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

/// [`SurfaceRegistry::apply_scene_tree`] on the process registry
pub fn apply_scene_tree(surface: &Rc<dyn Surface>, root: NodeDescriptor) -> ApplyOutcome {
    with_registry(|registry| registry.apply_scene_tree(surface, root)).unwrap_or(ApplyOutcome::Rejected)
}

/// [`SurfaceRegistry::apply_scene_patch`] on the process registry
pub fn apply_scene_patch(surface: &Rc<dyn Surface>, ops: &[Op]) -> ApplyOutcome {
    with_registry(|registry| registry.apply_scene_patch(surface, ops)).unwrap_or(ApplyOutcome::Rejected)
}

/// [`SurfaceRegistry::dispose_host`] on the process registry
pub fn dispose_host(id: SurfaceId) -> bool {
    with_registry(|registry| registry.dispose_host(id)).unwrap_or(false)
}

/// [`SurfaceRegistry::pump_frame`] on the process registry
pub fn pump_frame() -> Vec<SurfaceId> {
    with_registry(SurfaceRegistry::pump_frame).unwrap_or_default()
}
