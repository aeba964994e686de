//! # Wirebox
//!
//! A dependency-resolution and object-lifecycle container: a registry
//! of named definitions plus a resolver that turns definitions into
//! live instances, enforces per-entry lifecycle scope, detects
//! circular dependencies, supports runtime-conditional bindings,
//! lazily-initialized request proxies, and composition of namespaced
//! sub-containers into one addressable space.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`container`] | Container handle, caches, public API |
//! | [`registry`] | Named definition registry |
//! | [`conditional`] | Predicate-gated bindings with memoization |
//! | [`proxy`] | Lazy request-scope proxies |
//! | [`composite`] | Namespace routing over sub-containers |
//! | [`observer`] | Resolution tracing hooks |
//! | [`config`] | TOML/env definition loading |
//! | [`logging`] | Structured logging bootstrap |

pub mod composite;
pub mod conditional;
pub mod config;
pub mod container;
pub mod logging;
pub mod observer;
pub mod proxy;
pub mod registry;
mod resolver;

pub use composite::CompositeContainer;
pub use conditional::{ConditionalBindings, Predicate};
pub use config::{DefinitionsConfig, DefinitionsLoader, EnvVarEntry};
pub use container::{Container, ContainerBuilder, Overrides};
pub use observer::{ResolveObserver, TracingObserver};
pub use proxy::{force, LazyProxy};
pub use registry::DefinitionRegistry;

// Domain layer re-exports so most users depend on one crate.
pub use wirebox_core::constants;
pub use wirebox_core::definition::{
    Binding, Definition, FactoryDefinition, MethodInjection, ObjectDefinition, TemplateSegment,
};
pub use wirebox_core::error::{Error, Result};
pub use wirebox_core::metadata::{
    AwareInjection, CtorParam, MetadataProvider, NullMetadataProvider, Setter,
    StaticMetadataProvider, TypeMetadata,
};
pub use wirebox_core::scope::Scope;
pub use wirebox_core::value::{display_value, downcast, value, Value};
