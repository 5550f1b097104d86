//! Platform hooks used while acquiring the library

use std::time::Duration;

use futures::future::BoxFuture;

use crate::render::Library;

use super::LoadError;

/// Platform services the loader relies on
///
/// A browser-backed implementation maps these onto global lookups, dynamic
/// module import and script tags; the headless backend scripts them.
pub trait LibraryHost: Send + Sync {
    /// The library, if it is already globally available
    fn global_library(&self) -> Option<Library>;

    /// Dynamically import the module at `url`
    fn import_module(&self, url: &str) -> BoxFuture<'static, Result<Library, LoadError>>;

    /// Whether a loader tag for `source` is already present
    fn has_loader_tag(&self, source: &str) -> bool;

    /// Insert a loader tag for `source`
    fn insert_loader_tag(&self, source: &str) -> Result<(), LoadError>;

    /// Wait up to `timeout` for the library to become globally available
    fn wait_for_global(&self, timeout: Duration) -> BoxFuture<'static, Option<Library>>;
}
