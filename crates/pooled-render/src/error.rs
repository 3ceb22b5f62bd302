//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the error type for every registry and
//! rendering operation. It abstracts over the underlying template engine's
//! errors: engine failures travel as an opaque [`ExecutionError`] cause, so the
//! public API never exposes engine types.

use std::io;

use thiserror::Error;

/// Opaque cause of a failed template execution.
///
/// Engines box their own error type into this; callers reach it through
/// [`std::error::Error::source`].
pub type ExecutionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for template rendering operations.
///
/// Every variant is terminal for the call that produced it. Nothing is
/// retried, and nothing was written to the caller's sink.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template is registered under the requested name.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },

    /// The engine rejected the template/data combination.
    ///
    /// Covers missing sub-templates, incompatible data shapes, data that
    /// cannot be serialized, and any other engine-level fault.
    #[error("failed to render template '{name}': {source}")]
    Execution {
        name: String,
        #[source]
        source: ExecutionError,
    },

    /// Template source failed to compile.
    #[error("failed to compile template '{name}': {message}")]
    Compile { name: String, message: String },

    /// The rendered output could not be written to the sink.
    #[error("failed to write rendered template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    pub(crate) fn not_found(name: &str) -> Self {
        RenderError::TemplateNotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn execution(name: &str, source: impl Into<ExecutionError>) -> Self {
        RenderError::Execution {
            name: name.to_string(),
            source: source.into(),
        }
    }

    /// The template name the failed call was about.
    pub fn template_name(&self) -> &str {
        match self {
            RenderError::TemplateNotFound { name }
            | RenderError::Execution { name, .. }
            | RenderError::Compile { name, .. }
            | RenderError::Io { name, .. } => name,
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
