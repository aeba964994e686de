//! # Wirebox Domain Layer
//!
//! Core types shared by the container crate: the declarative
//! [`Definition`](definition::Definition) model, the error taxonomy,
//! the opaque [`Value`](value::Value) currency, lifecycle
//! [`Scope`](scope::Scope) policies, and the static metadata-provider
//! interface used by autowiring.
//!
//! This crate is a pure library with no container logic of its own:
//! resolution, caching, and lifecycle management live in the
//! `wirebox` crate.

pub mod constants;
pub mod definition;
pub mod error;
pub mod metadata;
pub mod scope;
pub mod value;

pub use definition::{
    Binding, Definition, FactoryDefinition, MethodInjection, ObjectDefinition, TemplateSegment,
};
pub use error::{Error, Result};
pub use metadata::{
    AwareInjection, CtorParam, MetadataProvider, NullMetadataProvider, Setter,
    StaticMetadataProvider, TypeMetadata,
};
pub use scope::Scope;
pub use value::{display_value, downcast, value, Value};
