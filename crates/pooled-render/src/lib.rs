//! # Pooled Render - Buffered Template Rendering
//!
//! `pooled-render` is a small, thread-safe facade over a template engine:
//! register compiled templates once under a name, then render them by name
//! into any [`std::io::Write`] sink, as often and from as many threads as
//! needed.
//!
//! Two properties are guaranteed for every render:
//!
//! - **All or nothing.** Output is expanded into a scratch buffer first and
//!   copied to the sink only if expansion succeeded. A failing template
//!   never leaves half a page in an HTTP response.
//! - **No per-call buffer allocation.** Scratch buffers come from a
//!   [`BufferPool`] and go back to it on every exit path.
//!
//! ## Core Concepts
//!
//! - [`Renderer`]: registry + pool, the main entry point
//! - [`TemplateSet`]: compiles template sources (MiniJinja syntax)
//! - [`Template`]: the engine seam; implement it to plug in another engine
//! - [`TemplateRegistry`]: concurrent name → template map
//! - [`BufferPool`] / [`PoolConfig`]: scratch buffer reuse and its bounds
//! - [`RenderError`]: `TemplateNotFound`, `Execution`, `Compile`, `Io`
//!
//! ## Quick Start
//!
//! ```rust
//! use pooled_render::{RenderError, Renderer};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Page {
//!     title: String,
//! }
//!
//! let renderer = Renderer::new();
//! renderer
//!     .register_source("page", "<h1>{{ title }}</h1>")
//!     .unwrap();
//!
//! let mut response = Vec::new();
//! renderer
//!     .render(&mut response, "page", &Page { title: "Report".into() })
//!     .unwrap();
//! assert_eq!(response, b"<h1>Report</h1>");
//!
//! let err = renderer.render(&mut response, "missing", &()).unwrap_err();
//! assert!(matches!(err, RenderError::TemplateNotFound { .. }));
//! assert_eq!(response, b"<h1>Report</h1>");
//! ```
//!
//! ## Escaping
//!
//! Templates compiled by [`TemplateSet`] HTML-escape every value they
//! print, since the usual sink is an HTTP response. Use `{{ value | safe }}`
//! for trusted markup.
//!
//! ## Multi-Entry Templates
//!
//! A handle may hold several entries that include or extend each other.
//! The registry name selects the entry that is rendered:
//!
//! ```rust
//! use pooled_render::{Renderer, TemplateSet};
//!
//! let page = TemplateSet::new()
//!     .add("base", "<body>{% block content %}{% endblock %}</body>")
//!     .unwrap()
//!     .add("home", r#"{% extends "base" %}{% block content %}home{% endblock %}"#)
//!     .unwrap()
//!     .build();
//!
//! let renderer = Renderer::new();
//! renderer.register("home", page);
//! assert_eq!(
//!     renderer.render_to_string("home", &()).unwrap(),
//!     "<body>home</body>"
//! );
//! ```
//!
//! ## Logging
//!
//! Events are emitted through [`tracing`] (`debug` for registration and
//! failed renders, `trace` for pool activity). No subscriber is installed;
//! errors are always returned to the caller, never only logged.

mod error;
pub mod pool;
pub mod prelude;
pub mod template;

pub use error::{ExecutionError, RenderError, Result};
pub use pool::{BufferPool, PoolConfig, PoolStats, PooledBuffer};
pub use template::{
    buffered_render, MiniJinjaTemplate, Renderer, SharedTemplate, Template, TemplateRegistry,
    TemplateSet,
};
