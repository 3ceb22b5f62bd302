//! Concurrent name → template registry.
//!
//! [`TemplateRegistry`] maps template names to compiled [`Template`] handles
//! and can be shared freely between threads. Registration and lookup are
//! each a single critical section over the map; no compilation, execution
//! or I/O ever happens while the lock is held.
//!
//! # Replacement
//!
//! Registering a name that already exists replaces the earlier handle
//! (last writer wins). Lookups hand out an `Arc` snapshot, so a render that
//! already resolved a handle keeps using it even if the name is replaced
//! while it runs.
//!
//! # Example
//!
//! ```rust
//! use pooled_render::template::{TemplateRegistry, TemplateSet};
//!
//! let registry = TemplateRegistry::new();
//! registry.register("greet", TemplateSet::single("greet", "Hi {{ name }}").unwrap());
//!
//! assert!(registry.contains("greet"));
//! assert!(registry.resolve("missing").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::engine::Template;

/// Shared handle to a registered template.
pub type SharedTemplate = Arc<dyn Template>;

/// Thread-safe registry of compiled templates, keyed by name.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: RwLock<HashMap<String, SharedTemplate>>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `template` under `name`, replacing any earlier handle.
    ///
    /// Returns the replaced handle, if there was one. Never fails.
    pub fn register<T>(&self, name: impl Into<String>, template: T) -> Option<SharedTemplate>
    where
        T: Template + 'static,
    {
        self.register_shared(name, Arc::new(template))
    }

    /// Registers an already shared handle under `name`.
    ///
    /// Useful for registering one handle under several names.
    pub fn register_shared(
        &self,
        name: impl Into<String>,
        template: SharedTemplate,
    ) -> Option<SharedTemplate> {
        let name = name.into();
        let previous = self.write().insert(name.clone(), template);
        if previous.is_some() {
            tracing::debug!(template = %name, "replaced registered template");
        } else {
            tracing::debug!(template = %name, "registered template");
        }
        previous
    }

    /// Looks up the current handle for `name`.
    pub fn resolve(&self, name: &str) -> Option<SharedTemplate> {
        self.read().get(name).cloned()
    }

    /// Removes the handle registered under `name`.
    ///
    /// Renders that already resolved it run to completion.
    pub fn remove(&self, name: &str) -> Option<SharedTemplate> {
        let removed = self.write().remove(name);
        if removed.is_some() {
            tracing::debug!(template = %name, "removed template");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every critical section is a single map operation, so a poisoned lock
    // never guards a half-written map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SharedTemplate>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SharedTemplate>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("names", &self.names())
            .finish()
    }
}
