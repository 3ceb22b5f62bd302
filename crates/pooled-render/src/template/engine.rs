//! Template engine abstraction.
//!
//! This module defines the [`Template`] trait, the seam between the registry
//! and whatever actually expands templates. A [`Template`] is an immutable,
//! already-compiled handle holding one or more named bodies ("entries").
//!
//! The default implementation is [`MiniJinjaTemplate`], produced by compiling
//! sources through a [`TemplateSet`].

use std::fmt;
use std::io;

use minijinja::{AutoEscape, Environment, Value};

use crate::error::{ExecutionError, RenderError, Result};

/// A compiled template handle that can expand its entries against data.
///
/// Implementations must be immutable once built: the registry shares them
/// between threads and never hands out mutable access.
pub trait Template: Send + Sync {
    /// Expands the entry `entry` with `data` as context, writing into `out`.
    ///
    /// `data` is [`serde_json::Value::Null`] when the caller supplied no
    /// data. Fails if `entry` is not part of this handle, or if the engine
    /// rejects the data.
    fn execute(
        &self,
        entry: &str,
        data: &serde_json::Value,
        out: &mut dyn io::Write,
    ) -> std::result::Result<(), ExecutionError>;

    /// Whether this handle contains an entry named `entry`.
    fn has_entry(&self, entry: &str) -> bool;
}

/// MiniJinja-backed compiled template handle.
///
/// Wraps a frozen MiniJinja environment. Entries can `{% include %}` and
/// `{% extends %}` one another; referencing an entry that is not part of
/// the set fails at execution time. Printed values are HTML-escaped.
///
/// Data that is neither a map nor absent (a bare string, number or list)
/// is accepted only by entries that read no fields.
///
/// # Example
///
/// ```rust
/// use pooled_render::template::{Template, TemplateSet};
/// use serde_json::json;
///
/// let template = TemplateSet::single("greet", "Hello, {{ name }}!").unwrap();
///
/// let mut out = Vec::new();
/// template.execute("greet", &json!({ "name": "World" }), &mut out).unwrap();
/// assert_eq!(out, b"Hello, World!");
/// ```
pub struct MiniJinjaTemplate {
    env: Environment<'static>,
    entries: Vec<String>,
}

impl MiniJinjaTemplate {
    /// Names of the entries compiled into this handle, in insertion order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl fmt::Debug for MiniJinjaTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiniJinjaTemplate")
            .field("entries", &self.entries)
            .finish()
    }
}

impl Template for MiniJinjaTemplate {
    fn execute(
        &self,
        entry: &str,
        data: &serde_json::Value,
        out: &mut dyn io::Write,
    ) -> std::result::Result<(), ExecutionError> {
        let tmpl = self.env.get_template(entry)?;
        let ctx = match data {
            // No data: every field lookup expands to nothing.
            serde_json::Value::Null => Value::from_serialize(serde_json::Map::new()),
            serde_json::Value::Object(_) => Value::from_serialize(data),
            // A scalar or list root has no fields; only templates that look
            // none up can render against it.
            other => {
                let mut fields: Vec<String> =
                    tmpl.undeclared_variables(false).into_iter().collect();
                if !fields.is_empty() {
                    fields.sort();
                    return Err(format!(
                        "template reads fields ({}) but the data is {}",
                        fields.join(", "),
                        json_kind(other)
                    )
                    .into());
                }
                Value::from_serialize(serde_json::Map::new())
            }
        };
        tmpl.render_to_write(ctx, out)?;
        Ok(())
    }

    fn has_entry(&self, entry: &str) -> bool {
        self.env.get_template(entry).is_ok()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

/// Compiles template sources into a [`MiniJinjaTemplate`].
///
/// Each source is compiled as it is added, so syntax errors surface
/// immediately rather than on first render.
///
/// ```rust
/// use pooled_render::template::{Template, TemplateSet};
///
/// let template = TemplateSet::new()
///     .add("layout", "<main>{% block body %}{% endblock %}</main>")
///     .unwrap()
///     .add("page", r#"{% extends "layout" %}{% block body %}hi{% endblock %}"#)
///     .unwrap()
///     .build();
///
/// assert!(template.has_entry("page"));
/// assert!(!template.has_entry("missing"));
/// ```
pub struct TemplateSet {
    env: Environment<'static>,
    entries: Vec<String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSet {
    /// Creates an empty set.
    ///
    /// Every entry HTML-escapes the values it prints, whatever its name.
    /// Use `{{ value | safe }}` for trusted markup, or replace the callback
    /// through [`environment_mut`](Self::environment_mut) to opt out.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self {
            env,
            entries: Vec::new(),
        }
    }

    /// Compiles a one-entry handle.
    pub fn single(name: &str, source: &str) -> Result<MiniJinjaTemplate> {
        Ok(Self::new().add(name, source)?.build())
    }

    /// Compiles `source` and adds it under `name`, replacing any earlier
    /// entry of that name.
    pub fn add(mut self, name: &str, source: &str) -> Result<Self> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| RenderError::Compile {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        if !self.entries.iter().any(|e| e == name) {
            self.entries.push(name.to_string());
        }
        Ok(self)
    }

    /// Mutable access to the environment before it is frozen, for
    /// registering filters, functions or globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Freezes the set into an immutable handle.
    pub fn build(self) -> MiniJinjaTemplate {
        MiniJinjaTemplate {
            env: self.env,
            entries: self.entries,
        }
    }
}
