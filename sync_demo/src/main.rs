//! Headless scene sync demo
//!
//! Replays a JSON scene script (a reset tree followed by patches, resizes and
//! frames) against one headless surface through the process registry, then
//! logs what the renderer was asked to do.
//!
//! Usage: `sync_demo [config.toml] [script.json]`

use std::rc::Rc;
use std::sync::Arc;

use scene_sync::backend::headless::{HeadlessLibrary, HeadlessSurface, StaticLibraryHost};
use scene_sync::config::ConfigError;
use scene_sync::foundation::logging;
use scene_sync::prelude::*;
use scene_sync::sync::registry;
use serde::Deserialize;

const DEFAULT_SCRIPT: &str = include_str!("../assets/scene.json");

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Script {
    surface: SurfaceSpec,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct SurfaceSpec {
    id: u64,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Step {
    Reset(NodeDescriptor),
    Patch(Vec<Op>),
    Resize { width: u32, height: u32 },
    Frames(u32),
}

fn load_script(path: Option<&str>) -> Result<Script, DemoError> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    Ok(serde_json::from_str(&contents)?)
}

/// Library host that resolves through the configured sources
fn library_host(config: &SyncConfig, library: Library) -> StaticLibraryHost {
    let host = if config.loader.module_url.is_some() {
        StaticLibraryHost::with_module(library)
    } else {
        StaticLibraryHost::unavailable(library)
    };
    match config.loader.fallback_sources.last() {
        Some(source) => host.appearing_after(source.clone()),
        None => host,
    }
}

fn run(config_path: Option<&str>, script_path: Option<&str>) -> Result<(), DemoError> {
    let config = match config_path {
        Some(path) => SyncConfig::load_from_file(path)?,
        None => SyncConfig::default(),
    };
    let script = load_script(script_path)?;
    log::info!("Replaying {} script steps", script.steps.len());

    let library = Arc::new(HeadlessLibrary::new());
    let shared: Library = library.clone();
    registry::install(SurfaceRegistry::from_config(&config, Arc::new(library_host(&config, shared))));

    let headless = Rc::new(HeadlessSurface::new(
        script.surface.id,
        script.surface.width,
        script.surface.height,
    ));
    let surface: Rc<dyn Surface> = headless.clone();
    let surface_id = surface.id();

    let state = registry::with_registry(|registry| {
        registry.host_for(&surface).map(|host| pollster::block_on(host.wait_ready()))
    })
    .flatten();
    log::info!("Host for {} is {:?}", surface_id, state);

    for step in script.steps {
        match step {
            Step::Reset(root) => {
                let nodes = root.node_count();
                let outcome = registry::apply_scene_tree(&surface, root);
                log::info!("Reset with {} nodes: {:?}", nodes, outcome);
            }
            Step::Patch(ops) => {
                let outcome = registry::apply_scene_patch(&surface, &ops);
                log::info!("Patch of {} ops: {:?}", ops.len(), outcome);
            }
            Step::Resize { width, height } => {
                headless.set_client_size(width, height);
                let outcome = registry::with_registry(|registry| registry.notify_resize(surface_id));
                log::info!("Resize to {}x{}: {:?}", width, height, outcome);
            }
            Step::Frames(count) => {
                for _ in 0..count {
                    let stopped = registry::pump_frame();
                    if stopped.contains(&surface_id) {
                        log::warn!("Render loop for {} stopped", surface_id);
                        break;
                    }
                }
            }
        }
    }

    registry::with_registry(|registry| {
        if let Some(graph) = registry.host(surface_id).and_then(SceneSync::graph) {
            log::info!(
                "Final graph: {} objects, active camera {:?}",
                graph.len(),
                graph.active_camera()
            );
        }
    });
    if let Some(stats) = library.renderer_stats(0) {
        log::info!(
            "Renderer: {} frames, last camera {:?}, {} draw items, {} lights, size {:?}, {} resources released",
            stats.frames,
            stats.last_camera,
            stats.last_draw_items,
            stats.last_lights,
            stats.size,
            stats.released.len()
        );
    }

    registry::dispose_host(surface_id);
    registry::uninstall();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::try_init();

    log::info!("Starting scene sync demo");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args.first().map(String::as_str), args.get(1).map(String::as_str)) {
        log::error!("Demo failed: {}", e);
        return Err(e.into());
    }

    log::info!("Scene sync demo finished");
    Ok(())
}
