//! Buffered rendering through a shared buffer pool.
//!
//! This module provides [`Renderer`], which pairs a [`TemplateRegistry`] with
//! a [`BufferPool`], and [`buffered_render`], the same rendering discipline
//! for a single template handle without a registry.
//!
//! # All or Nothing
//!
//! A render never writes directly to the caller's sink. The template is
//! first expanded into a scratch buffer borrowed from the pool; only when
//! expansion succeeds is the buffer copied to the sink, in a single write.
//! A failed render leaves the sink untouched, which matters when the sink is
//! a response stream that cannot take bytes back.
//!
//! The scratch buffer goes back to the pool when the call returns, whether
//! it succeeded or not.
//!
//! ```text
//! render(sink, "page", data)
//!   ├─ registry.resolve("page")        → TemplateNotFound, nothing borrowed
//!   ├─ pool.acquire()                  → empty scratch buffer
//!   ├─ template.execute(page, data)    → Execution error, sink untouched
//!   └─ sink.write_all(buffer)          → Io error
//!      (buffer returned to the pool on every path)
//! ```

use std::io;
use std::sync::Arc;

use serde::Serialize;

use super::engine::Template;
use super::registry::{SharedTemplate, TemplateRegistry};
use super::TemplateSet;
use crate::error::{RenderError, Result};
use crate::pool::BufferPool;

/// Renders registered templates into caller-supplied sinks.
///
/// `Renderer` is `Send + Sync` and every method takes `&self`: register
/// templates once at startup, then render from as many threads as needed.
///
/// # Example
///
/// ```rust
/// use pooled_render::Renderer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Greeting { name: String }
///
/// let renderer = Renderer::new();
/// renderer.register_source("greet", "<p>Hello, {{ name }}</p>").unwrap();
///
/// let mut out = Vec::new();
/// renderer
///     .render(&mut out, "greet", &Greeting { name: "Ada".into() })
///     .unwrap();
/// assert_eq!(out, b"<p>Hello, Ada</p>");
/// ```
#[derive(Debug, Default)]
pub struct Renderer {
    registry: TemplateRegistry,
    pool: Arc<BufferPool>,
}

impl Renderer {
    /// Creates a renderer with an empty registry and a default pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer drawing scratch buffers from `pool`.
    ///
    /// The pool may be shared with other renderers.
    pub fn with_pool(pool: Arc<BufferPool>) -> Self {
        Self {
            registry: TemplateRegistry::new(),
            pool,
        }
    }

    /// Registers a compiled template under `name`, replacing any earlier one.
    ///
    /// Rendering `name` executes the entry of the same name inside the
    /// handle, so the handle must contain an entry called `name`. A handle
    /// without one is still registered, but every render of it fails.
    pub fn register<T>(&self, name: impl Into<String>, template: T) -> Option<SharedTemplate>
    where
        T: Template + 'static,
    {
        let name = name.into();
        if !template.has_entry(&name) {
            tracing::debug!(template = %name, "registered template has no entry of that name");
        }
        self.registry.register(name, template)
    }

    /// Whether `name` is registered and its handle contains the entry
    /// `name`, i.e. whether [`render`](Self::render) can find something to
    /// execute.
    pub fn can_render(&self, name: &str) -> bool {
        self.registry
            .resolve(name)
            .is_some_and(|template| template.has_entry(name))
    }

    /// Compiles `source` as a one-entry template and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Compile`] if the source has a syntax error. The
    /// registry is left unchanged in that case.
    pub fn register_source(&self, name: &str, source: &str) -> Result<()> {
        let template = TemplateSet::single(name, source)?;
        self.registry.register(name, template);
        Ok(())
    }

    /// Looks up the handle currently registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<SharedTemplate> {
        self.registry.resolve(name)
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Renders template `name` with `data` and writes the output to `sink`.
    ///
    /// Pass `&()` or `&None::<T>` when there is no data; field references
    /// then expand to nothing.
    ///
    /// # Errors
    ///
    /// - [`RenderError::TemplateNotFound`] if `name` is not registered
    /// - [`RenderError::Execution`] if the template fails to expand
    /// - [`RenderError::Io`] if writing to `sink` fails
    ///
    /// On the first two, nothing is written to `sink`.
    pub fn render<W, T>(&self, sink: &mut W, name: &str, data: &T) -> Result<()>
    where
        W: io::Write + ?Sized,
        T: Serialize + ?Sized,
    {
        let template = self.lookup(name)?;
        buffered_render(&self.pool, template.as_ref(), sink, name, data)
    }

    /// Renders template `name` with `data` into a new `String`.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render); output that is not valid UTF-8 is
    /// reported as [`RenderError::Execution`].
    pub fn render_to_string<T>(&self, name: &str, data: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let template = self.lookup(name)?;
        let mut buf = self.pool.acquire();
        execute_into(template.as_ref(), name, data, &mut buf)?;
        let output = std::str::from_utf8(&buf)
            .map(str::to_owned)
            .map_err(|e| RenderError::execution(name, e));
        output
    }

    fn lookup(&self, name: &str) -> Result<SharedTemplate> {
        self.registry.resolve(name).ok_or_else(|| {
            tracing::debug!(template = %name, "render of unregistered template");
            RenderError::not_found(name)
        })
    }
}

/// Renders entry `name` of `template` into `sink`, buffering through `pool`.
///
/// This is the registry-free form of [`Renderer::render`]: the output is
/// expanded into a pooled scratch buffer and copied to `sink` only on
/// success.
///
/// ```rust
/// use pooled_render::{buffered_render, BufferPool, TemplateSet};
///
/// let pool = BufferPool::default();
/// let template = TemplateSet::single("one", "<one>{{ test }}</one>").unwrap();
///
/// let mut out = Vec::new();
/// buffered_render(&pool, &template, &mut out, "one", &()).unwrap();
/// assert_eq!(out, b"<one></one>");
///
/// let err = buffered_render(&pool, &template, &mut out, "two", &()).unwrap_err();
/// assert!(err.to_string().contains("two"));
/// ```
pub fn buffered_render<W, T>(
    pool: &BufferPool,
    template: &dyn Template,
    sink: &mut W,
    name: &str,
    data: &T,
) -> Result<()>
where
    W: io::Write + ?Sized,
    T: Serialize + ?Sized,
{
    let mut buf = pool.acquire();
    execute_into(template, name, data, &mut buf)?;
    sink.write_all(&buf).map_err(|source| {
        tracing::debug!(template = %name, error = %source, "writing rendered template failed");
        RenderError::Io {
            name: name.to_string(),
            source,
        }
    })
}

fn execute_into<T>(template: &dyn Template, name: &str, data: &T, buf: &mut Vec<u8>) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let result = serde_json::to_value(data)
        .map_err(|e| RenderError::execution(name, e))
        .and_then(|value| {
            template
                .execute(name, &value, buf)
                .map_err(|source| RenderError::Execution {
                    name: name.to_string(),
                    source,
                })
        });

    if let Err(err) = &result {
        tracing::debug!(template = %name, error = %err, "template execution failed");
    }
    result
}
