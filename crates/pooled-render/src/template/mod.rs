//! Template handles, the registry that names them, and the pooled renderer.
//!
//! ## Pieces
//!
//! - [`Template`]: a compiled handle holding one or more named entries. The
//!   engine behind it is pluggable; [`MiniJinjaTemplate`] is the default.
//! - [`TemplateSet`]: compiles sources into a [`MiniJinjaTemplate`].
//! - [`TemplateRegistry`]: thread-safe name → handle map.
//! - [`Renderer`]: registry plus buffer pool; renders by name into any
//!   [`std::io::Write`] sink.
//! - [`buffered_render`]: the pooled render of one handle, without a registry.
//!
//! ## Lifecycle
//!
//! ```text
//! TemplateSet::single(..)  ──►  Renderer::register(name, handle)   (startup)
//! Renderer::render(sink, name, data)                                (per call)
//! ```
//!
//! The templating language itself (variables, loops, includes, filters) is
//! MiniJinja's; nothing here interprets template syntax.

mod engine;
mod registry;
mod renderer;

pub use engine::{MiniJinjaTemplate, Template, TemplateSet};
pub use registry::{SharedTemplate, TemplateRegistry};
pub use renderer::{buffered_render, Renderer};
