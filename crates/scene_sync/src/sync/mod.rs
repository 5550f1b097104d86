//! Keeping per-surface scene graphs in step with the remote description
//!
//! - [`OpApplier`] maps each operation onto the object graph
//! - [`PendingState`] holds work received before the library resolved
//! - [`SceneSync`] is the per-surface host tying graph, renderer, render loop
//!   and resize adapter together
//! - [`SurfaceRegistry`] maps surfaces to hosts, creating them on first use

mod applier;
mod pending;
mod host;
pub mod registry;


pub use applier::{BatchReport, OpApplier};
pub use pending::PendingState;
pub use host::{ApplyOutcome, HostState, SceneSync};
pub use registry::SurfaceRegistry;
