//! # Scene Sync
//!
//! Keeps a retained-mode 3D scene graph, hosted on a rendering surface, in
//! step with a remotely authored scene description.
//!
//! ## Features
//!
//! - **Full and incremental updates**: replace the scene from a node tree, or
//!   patch it with ordered create/attach/detach/set/unset/delete operations
//! - **Buffering**: work that arrives before the rendering library has loaded
//!   is kept and replayed in order once it resolves
//! - **Single-flight loading**: one library acquisition shared by every host
//! - **Render and resize driving**: an explicit per-frame entry point and
//!   layout-driven renderer and camera updates
//! - **Forgiving**: malformed or stale operations are ignored, never reported
//!   back to the remote authority
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use scene_sync::prelude::*;
//! use scene_sync::backend::headless::{HeadlessLibrary, HeadlessSurface, StaticLibraryHost};
//!
//! let library = HeadlessLibrary::new().into_library();
//! let host = Arc::new(StaticLibraryHost::with_module(library));
//! let mut registry = SurfaceRegistry::from_config(&SyncConfig::default(), host);
//!
//! let surface: Rc<dyn Surface> = Rc::new(HeadlessSurface::new(1, 800, 600));
//! let root = NodeDescriptor::new(1, Kind::Scene)
//!     .with_child(NodeDescriptor::new(2, Kind::PerspectiveCamera)
//!         .with_prop("active", PropValue::bool(true)));
//!
//! registry.apply_scene_tree(&surface, root);
//! registry.apply_scene_patch(&surface, &[Op::create(3, Kind::Group), Op::attach(1, 3)]);
//! registry.pump_frame();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod foundation;
pub mod config;
pub mod protocol;
pub mod scene;
pub mod render;
pub mod loader;
pub mod sync;
pub mod backend;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, LoaderConfig, RenderLoopConfig, SyncConfig},
        loader::{LibraryHost, LibraryLoader, LoadError},
        protocol::{Kind, NodeDescriptor, NodeId, Op, PropValue},
        render::{FrameOutcome, Library, RenderLibrary, Renderer, ResizeOutcome, Surface, SurfaceId},
        scene::ObjectGraph,
        sync::{ApplyOutcome, BatchReport, HostState, SceneSync, SurfaceRegistry},
    };
}
