//! Composite container router
//!
//! Groups independent containers under namespace prefixes plus one
//! default container, exposed as a single lookup surface. Routing is
//! longest-proper-prefix first, then a linear `has` scan over every
//! member, then the default container. Request lifecycle hooks fan
//! out to all members.

use wirebox_core::constants::{normalize, SEPARATOR};
use wirebox_core::error::{Error, Result};
use wirebox_core::value::Value;

use crate::container::Container;

/// Router over namespaced sub-containers with a default fallback
pub struct CompositeContainer {
    /// (prefix with trailing separator, container), registration order
    namespaces: Vec<(String, Container)>,
    default: Container,
}

impl CompositeContainer {
    /// Create a composite with a default/root container
    pub fn new(default: Container) -> Self {
        Self {
            namespaces: Vec::new(),
            default,
        }
    }

    /// Mount a container under a namespace prefix
    ///
    /// The prefix is normalized and given a trailing separator, so
    /// `"billing"` routes every `billing.*` name.
    pub fn with_namespace<S: Into<String>>(mut self, prefix: S, container: Container) -> Self {
        let mut prefix = normalize(&prefix.into()).to_string();
        if !prefix.is_empty() && !prefix.ends_with(SEPARATOR) {
            prefix.push(SEPARATOR);
        }
        self.namespaces.push((prefix, container));
        self
    }

    /// The default/root container
    pub fn default_container(&self) -> &Container {
        &self.default
    }

    /// Whether any member (or the default) can resolve a name
    pub fn has(&self, name: &str) -> bool {
        let name = normalize(name);
        self.namespaces.iter().any(|(_, c)| c.has(name)) || self.default.has(name)
    }

    /// Resolve a name through namespace routing
    ///
    /// The sub-container whose namespace is the longest proper prefix
    /// of the name is tried first; if it lacks the entry, every member
    /// is scanned in registration order; finally the default container
    /// is consulted.
    pub fn lookup(&self, name: &str) -> Result<Value> {
        let name = normalize(name);

        let best = self
            .namespaces
            .iter()
            .filter(|(prefix, _)| {
                !prefix.is_empty() && name.starts_with(prefix.as_str()) && name.len() > prefix.len()
            })
            .max_by_key(|(prefix, _)| prefix.len());
        if let Some((prefix, container)) = best {
            if container.has(name) {
                tracing::trace!(name, prefix = prefix.as_str(), "routed by namespace");
                return container.get(name);
            }
        }

        for (_, container) in &self.namespaces {
            if container.has(name) {
                return container.get(name);
            }
        }

        if self.default.has(name) {
            return self.default.get(name);
        }
        Err(Error::not_found(name))
    }

    /// Alias for [`lookup`](Self::lookup)
    pub fn get(&self, name: &str) -> Result<Value> {
        self.lookup(name)
    }

    /// Open the request lifecycle on every member container
    pub fn start_request(&self) {
        for (_, container) in &self.namespaces {
            container.start_request();
        }
        self.default.start_request();
    }

    /// Close the request lifecycle on every member container
    pub fn end_request(&self) {
        for (_, container) in &self.namespaces {
            container.end_request();
        }
        self.default.end_request();
    }
}
