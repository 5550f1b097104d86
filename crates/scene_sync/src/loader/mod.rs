//! Process-wide, single-flight acquisition of the rendering library
//!
//! ## Resolution order
//!
//! 1. The library is already globally available: resolve immediately
//! 2. Import the configured module URL
//! 3. Walk the fallback script sources in order. A source whose loader tag is
//!    already present is reused rather than inserted again; each source gets a
//!    bounded wait for the library to become globally available
//!
//! The load fails only once every source is exhausted. All requesters share
//! one in-flight future, and a resolved library is cached for the loader's
//! lifetime.

mod host;

pub use host::LibraryHost;

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::config::LoaderConfig;
use crate::render::Library;

/// Shared, cloneable load result
pub type SharedLoad = Shared<BoxFuture<'static, Result<Library, LoadError>>>;

/// Library loading errors
///
/// Cloneable because a single result is handed to every requester.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The module import failed
    #[error("Module import of '{url}' failed: {reason}")]
    Import {
        /// Module URL
        url: String,
        /// Failure description
        reason: String,
    },

    /// A loader tag could not be inserted
    #[error("Could not insert loader for '{source_url}': {reason}")]
    ScriptInsert {
        /// Script source
        source_url: String,
        /// Failure description
        reason: String,
    },

    /// A fallback source did not expose the library in time
    #[error("'{source_url}' did not expose the library within {timeout_ms} ms")]
    Timeout {
        /// Script source
        source_url: String,
        /// Wait that elapsed
        timeout_ms: u64,
    },

    /// Every configured source failed
    #[error("All {} library sources failed", .attempts.len())]
    Exhausted {
        /// What went wrong with each source, in order
        attempts: Vec<LoadError>,
    },
}

enum LoadState {
    Idle,
    Loading(SharedLoad),
    Ready(Library),
}

struct LoaderInner {
    config: LoaderConfig,
    host: Arc<dyn LibraryHost>,
    state: Mutex<LoadState>,
}

/// Single-flight library loader
///
/// Cloning is cheap and every clone shares the same state, so one loader can
/// serve every host in the process.
#[derive(Clone)]
pub struct LibraryLoader {
    inner: Arc<LoaderInner>,
}

impl LibraryLoader {
    /// Create a loader over a platform host
    pub fn new(config: LoaderConfig, host: Arc<dyn LibraryHost>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                config,
                host,
                state: Mutex::new(LoadState::Idle),
            }),
        }
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Resolved library, if any
    pub fn cached(&self) -> Option<Library> {
        match &*self.inner.state.lock() {
            LoadState::Ready(library) => Some(Arc::clone(library)),
            _ => None,
        }
    }

    /// Whether a load is currently in flight
    pub fn is_loading(&self) -> bool {
        matches!(&*self.inner.state.lock(), LoadState::Loading(_))
    }

    /// Request the library
    ///
    /// Concurrent callers receive clones of the same in-flight future. Once
    /// resolved, later calls get an immediately ready future. A failed cycle
    /// returns the loader to idle, so only a later request starts over.
    pub fn load(&self) -> SharedLoad {
        let mut state = self.inner.state.lock();
        match &*state {
            LoadState::Ready(library) => {
                return future::ready(Ok(Arc::clone(library))).boxed().shared();
            }
            LoadState::Loading(in_flight) => return in_flight.clone(),
            LoadState::Idle => {}
        }

        log::info!("Loading rendering library");
        let inner = Arc::clone(&self.inner);
        let load = async move {
            let result = resolve(&inner.config, inner.host.as_ref()).await;
            let mut state = inner.state.lock();
            match &result {
                Ok(library) => {
                    log::info!("Rendering library '{}' resolved", library.name());
                    *state = LoadState::Ready(Arc::clone(library));
                }
                Err(e) => {
                    log::warn!("Rendering library unavailable: {}", e);
                    *state = LoadState::Idle;
                }
            }
            result
        }
        .boxed()
        .shared();

        *state = LoadState::Loading(load.clone());
        load
    }
}

/// Walk the sources in order until one yields the library
async fn resolve(config: &LoaderConfig, host: &dyn LibraryHost) -> Result<Library, LoadError> {
    if let Some(library) = host.global_library() {
        log::debug!("Rendering library already available");
        return Ok(library);
    }

    let mut attempts = Vec::new();

    if let Some(url) = &config.module_url {
        match host.import_module(url).await {
            Ok(library) => return Ok(library),
            Err(e) => {
                log::debug!("{}", e);
                attempts.push(e);
            }
        }
    }

    for source in &config.fallback_sources {
        if host.has_loader_tag(source) {
            log::debug!("Reusing existing loader for '{}'", source);
        } else if let Err(e) = host.insert_loader_tag(source) {
            log::debug!("{}", e);
            attempts.push(e);
            continue;
        }

        match host.wait_for_global(config.source_timeout()).await {
            Some(library) => return Ok(library),
            None => {
                let e = LoadError::Timeout {
                    source_url: source.clone(),
                    timeout_ms: config.source_timeout_ms,
                };
                log::debug!("{}", e);
                attempts.push(e);
            }
        }
    }

    Err(LoadError::Exhausted { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessLibrary, StaticLibraryHost};

    fn loader(config: LoaderConfig, host: StaticLibraryHost) -> (LibraryLoader, Arc<StaticLibraryHost>) {
        crate::foundation::logging::init_for_tests();
        let host = Arc::new(host);
        (LibraryLoader::new(config, host.clone()), host)
    }

    fn sources() -> LoaderConfig {
        LoaderConfig::empty()
            .with_module_url("lib.module.js")
            .with_fallback("a.js")
            .with_fallback("b.js")
    }

    #[test]
    fn test_global_library_short_circuits() {
        let (loader, host) = loader(sources(), StaticLibraryHost::with_global(HeadlessLibrary::new().into_library()));

        let library = pollster::block_on(loader.load()).unwrap();
        assert_eq!(library.name(), "headless");
        assert_eq!(host.import_attempts(), 0);
        assert!(loader.cached().is_some());
    }

    #[test]
    fn test_module_import_is_preferred_over_fallbacks() {
        let (loader, host) = loader(sources(), StaticLibraryHost::with_module(HeadlessLibrary::new().into_library()));

        assert!(pollster::block_on(loader.load()).is_ok());
        assert_eq!(host.import_attempts(), 1);
        assert!(host.inserted_tags().is_empty());
    }

    #[test]
    fn test_fallbacks_are_tried_in_order() {
        let host = StaticLibraryHost::unavailable(HeadlessLibrary::new().into_library()).appearing_after("b.js");
        let (loader, host) = loader(sources(), host);

        assert!(pollster::block_on(loader.load()).is_ok());
        assert_eq!(host.inserted_tags(), vec!["a.js".to_string(), "b.js".to_string()]);
        assert_eq!(host.wait_attempts(), 2);
    }

    #[test]
    fn test_existing_loader_tag_is_reused() {
        let host = StaticLibraryHost::unavailable(HeadlessLibrary::new().into_library())
            .with_existing_tag("a.js")
            .appearing_after("a.js");
        let (loader, host) = loader(sources(), host);

        assert!(pollster::block_on(loader.load()).is_ok());
        assert!(host.inserted_tags().is_empty());
    }

    #[test]
    fn test_exhausted_sources_fail_and_reset_to_idle() {
        let (loader, host) = loader(sources(), StaticLibraryHost::unavailable(HeadlessLibrary::new().into_library()));

        let Err(LoadError::Exhausted { attempts }) = pollster::block_on(loader.load()) else {
            panic!("expected exhaustion");
        };
        assert_eq!(attempts.len(), 3);
        assert!(matches!(attempts[0], LoadError::Import { .. }));
        assert!(matches!(attempts[2], LoadError::Timeout { .. }));
        assert!(!loader.is_loading());
        assert!(loader.cached().is_none());

        // A fresh request starts a new cycle
        let _ = pollster::block_on(loader.load());
        assert_eq!(host.import_attempts(), 2);
    }

    #[test]
    fn test_concurrent_requests_share_one_future() {
        let host = StaticLibraryHost::with_module(HeadlessLibrary::new().into_library()).gated();
        let (loader, host) = loader(sources(), host);

        let first = loader.load();
        let second = loader.clone().load();
        assert!(first.peek().is_none());
        assert!(Shared::ptr_eq(&first, &second));

        host.open_gate();
        let (a, b) = pollster::block_on(future::join(first, second));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(host.import_attempts(), 1);
    }
}
