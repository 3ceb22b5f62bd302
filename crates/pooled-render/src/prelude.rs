//! Convenience re-exports for the common case.
//!
//! ```rust
//! use pooled_render::prelude::*;
//!
//! let renderer = Renderer::new();
//! renderer.register("hi", TemplateSet::single("hi", "hi").unwrap());
//! assert_eq!(renderer.render_to_string("hi", &()).unwrap(), "hi");
//! ```

pub use crate::error::{RenderError, Result};
pub use crate::pool::{BufferPool, PoolConfig};
pub use crate::template::{Renderer, Template, TemplateSet};
