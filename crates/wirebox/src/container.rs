//! Dependency-resolution and object-lifecycle container
//!
//! A [`Container`] is a cheap clonable handle over shared state:
//! the definition registry, the conditional binding evaluator, the
//! singleton cache, and the request-scope cache. Resolution itself is
//! single-threaded cooperative per call; call-local state (cycle
//! chain, diamond memo) lives in a per-call frame and never leaks
//! across calls.
//!
//! ## Usage
//!
//! ```rust
//! use wirebox::{Container, Definition};
//!
//! let container = Container::new();
//! container.register("greeting", Definition::value(String::from("hi"))).unwrap();
//! let v = container.get("greeting").unwrap();
//! assert_eq!(*wirebox::downcast::<String>(&v).unwrap(), "hi");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use wirebox_core::constants::{normalize, CONTAINER_SERVICE};
use wirebox_core::definition::{Binding, Definition};
use wirebox_core::error::Result;
use wirebox_core::metadata::{MetadataProvider, NullMetadataProvider};
use wirebox_core::value::Value;

use crate::conditional::{ConditionalBindings, Predicate};
use crate::observer::ResolveObserver;
use crate::proxy::RequestScope;
use crate::registry::DefinitionRegistry;
use crate::resolver::Frame;

/// Constructor-argument overrides for [`Container::make`],
/// keyed by parameter name
pub type Overrides = HashMap<String, Binding>;

pub(crate) struct ContainerInner {
    pub(crate) registry: DefinitionRegistry,
    pub(crate) conditional: ConditionalBindings,
    pub(crate) metadata: Arc<dyn MetadataProvider>,
    pub(crate) observers: Vec<Arc<dyn ResolveObserver>>,
    /// name → value, container lifetime
    pub(crate) singletons: DashMap<String, Value>,
    /// name → lazy proxy, reset by `end_request`
    pub(crate) requests: RequestScope,
}

/// Registry of named definitions plus the resolver that turns them
/// into live instances
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Create a container with no type metadata (objects cannot be
    /// constructed; suitable for value/alias/env/template graphs and
    /// tests)
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a container
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Register a definition under a name
    ///
    /// Later registration overrides earlier. Fails on structurally
    /// invalid definitions.
    pub fn register(&self, name: &str, definition: Definition) -> Result<()> {
        self.inner.registry.register(normalize(name), definition)
    }

    /// Register a conditional candidate for a name
    ///
    /// Candidates are evaluated in reverse registration order on each
    /// lookup until one matches; the match is then permanent. A plain
    /// [`register`](Self::register) for the same name acts as the
    /// fallback while no predicate matches.
    pub fn register_conditional(
        &self,
        name: &str,
        predicate: Predicate,
        definition: Definition,
    ) -> Result<()> {
        self.inner
            .conditional
            .register(normalize(name), predicate, definition)
    }

    /// Whether a definition (plain or conditional) exists for a name
    pub fn has(&self, name: &str) -> bool {
        let name = normalize(name);
        self.inner.conditional.has(name) || self.inner.registry.has(name)
    }

    /// Resolve a name to a value
    ///
    /// Singleton and request caches make this idempotent; prototype
    /// entries are rebuilt per top-level call. Fails with a not-found,
    /// circular-dependency, definition, or scope-violation error.
    pub fn get(&self, name: &str) -> Result<Value> {
        let mut frame = Frame::default();
        self.resolve_entry(name, &mut frame, None)
    }

    /// Resolve a name, bypassing the singleton/request cache for the
    /// requested name only
    ///
    /// `overrides` are constructor-argument bindings merged over the
    /// requested name's object definition. Dependencies reached during
    /// the same call share the normal caches.
    pub fn make(&self, name: &str, overrides: Overrides) -> Result<Value> {
        let mut frame = Frame::default();
        let bypass = Bypass {
            name: normalize(name).to_string(),
            overrides,
        };
        self.resolve_entry(name, &mut frame, Some(&bypass))
    }

    /// Replace the definition for a name and invalidate any cached
    /// value
    ///
    /// Also drops conditional candidates for the name: an explicit
    /// replacement supersedes a memoized conditional match.
    pub fn set(&self, name: &str, definition: Definition) -> Result<()> {
        let name = normalize(name);
        self.inner.registry.register(name, definition)?;
        self.inner.conditional.remove(name);
        self.inner.singletons.remove(name);
        self.inner.requests.remove(name);
        tracing::debug!(name, "definition replaced; caches invalidated");
        Ok(())
    }

    /// Replace the definition for a name with a literal value
    pub fn set_value<T: Send + Sync + 'static>(&self, name: &str, v: T) -> Result<()> {
        self.set(name, Definition::value(v))
    }

    /// Open a request lifecycle: request-scoped proxies become usable
    pub fn start_request(&self) {
        self.inner.requests.start();
        tracing::trace!("request scope started");
    }

    /// Close the request lifecycle: the request cache is cleared so a
    /// pooled worker never leaks proxies across unrelated requests
    pub fn end_request(&self) {
        self.inner.requests.end();
        tracing::trace!("request scope ended");
    }

    /// List all registered definition names
    pub fn names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    pub(crate) fn observers(&self) -> &[Arc<dyn ResolveObserver>] {
        &self.inner.observers
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.inner.registry.names().len())
            .field("singletons", &self.inner.singletons.len())
            .finish()
    }
}

/// Cache-bypass context for one [`Container::make`] call
pub(crate) struct Bypass {
    pub(crate) name: String,
    pub(crate) overrides: Overrides,
}

/// Builder for [`Container`]
pub struct ContainerBuilder {
    metadata: Arc<dyn MetadataProvider>,
    observers: Vec<Arc<dyn ResolveObserver>>,
}

impl ContainerBuilder {
    /// Start with a null metadata provider and no observers
    pub fn new() -> Self {
        Self {
            metadata: Arc::new(NullMetadataProvider::new()),
            observers: Vec::new(),
        }
    }

    /// Set the metadata provider used for autowiring
    pub fn with_metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = provider;
        self
    }

    /// Add a resolution observer
    pub fn with_observer(mut self, observer: Arc<dyn ResolveObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Build the container
    ///
    /// The container registers itself under the well-known
    /// `container` service name for container-aware injection. That
    /// self-registration makes the shared inner state self-referential,
    /// so a built container is never reclaimed: build one per process
    /// or composition root, not per request.
    pub fn build(self) -> Container {
        let container = Container {
            inner: Arc::new(ContainerInner {
                registry: DefinitionRegistry::new(),
                conditional: ConditionalBindings::new(),
                metadata: self.metadata,
                observers: self.observers,
                singletons: DashMap::new(),
                requests: RequestScope::default(),
            }),
        };
        let handle = container.clone();
        // Self-registration cannot fail: a value definition is always valid.
        let _ = container.register(CONTAINER_SERVICE, Definition::value(handle));
        container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
