//! Definition registry
//!
//! Holds named definitions, mutable at build time. Later registration
//! overrides earlier; structural validation happens on every insert so
//! malformed definitions never reach the resolver.

use std::sync::Arc;

use dashmap::DashMap;
use wirebox_core::definition::Definition;
use wirebox_core::error::Result;

/// Thread-safe registry of named definitions
#[derive(Clone, Default)]
pub struct DefinitionRegistry {
    /// Map of registered definitions by name
    definitions: Arc<DashMap<String, Definition>>,
}

impl DefinitionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under a name, overriding any previous entry
    pub fn register(&self, name: &str, definition: Definition) -> Result<()> {
        definition.validate()?;
        let replaced = self
            .definitions
            .insert(name.to_string(), definition)
            .is_some();
        if replaced {
            tracing::debug!(name, "definition replaced");
        } else {
            tracing::trace!(name, "definition registered");
        }
        Ok(())
    }

    /// Whether a definition exists for a name
    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<Definition> {
        self.definitions.get(name).map(|d| d.value().clone())
    }

    /// Remove a definition by name
    pub fn remove(&self, name: &str) -> Option<Definition> {
        self.definitions.remove(name).map(|(_, d)| d)
    }

    /// List all registered definition names
    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|e| e.key().clone()).collect()
    }
}
