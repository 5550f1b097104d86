//! Rendering backends
//!
//! Only a headless backend ships with the engine. It implements every
//! platform-facing trait ([`crate::loader::LibraryHost`],
//! [`crate::render::RenderLibrary`], [`crate::render::Renderer`],
//! [`crate::render::Surface`]) without a GPU, recording what it was asked to
//! do so tools and tests can inspect it.

pub mod headless;
