//! Static type metadata interface for autowiring
//!
//! The container never performs its own introspection. Constructor
//! signatures, setter appliers, and "aware" capability injections are
//! supplied up front through [`MetadataProvider`], typically by a
//! builder step or generated code. [`StaticMetadataProvider`] is the
//! stock map-backed implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::value::Value;

/// Constructs an instance from resolved constructor arguments,
/// in declared parameter order
pub type ConstructFn = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Applies a setter or method call to a constructed instance
pub type ApplyFn = Arc<dyn Fn(&Value, Vec<Value>) -> Result<()> + Send + Sync>;

/// Declared constructor parameter
#[derive(Clone)]
pub struct CtorParam {
    /// Parameter name, matched against explicit ctor bindings
    pub name: String,
    /// Declared type identifier used for autowiring, if any
    pub type_id: Option<String>,
    /// Default value used when no binding or autowire candidate exists
    pub default: Option<Value>,
}

impl CtorParam {
    /// Parameter autowired by its declared type
    pub fn typed<N: Into<String>, T: Into<String>>(name: N, type_id: T) -> Self {
        Self {
            name: name.into(),
            type_id: Some(type_id.into()),
            default: None,
        }
    }

    /// Parameter with no declared type (must be bound or defaulted)
    pub fn untyped<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            type_id: None,
            default: None,
        }
    }

    /// Attach a default value
    pub fn with_default<T: Send + Sync + 'static>(mut self, v: T) -> Self {
        self.default = Some(Arc::new(v));
        self
    }
}

impl fmt::Debug for CtorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtorParam")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// Declared setter/method on a type, with its applier
#[derive(Clone)]
pub struct Setter {
    /// Setter or method name
    pub name: String,
    /// Applier invoked with the instance and resolved arguments
    pub apply: ApplyFn,
}

/// Auto-appended injection for an "aware" capability
///
/// When a type reports a capability (container-aware, logger-aware),
/// the resolver resolves the well-known service name and applies it
/// through the capability's setter after explicit method injections.
#[derive(Clone)]
pub struct AwareInjection {
    /// Well-known service name resolved from the container
    pub service: String,
    /// Applier invoked with the instance and the resolved service
    pub apply: ApplyFn,
}

/// Complete metadata for one constructible type
#[derive(Clone)]
pub struct TypeMetadata {
    /// Type identifier bound in object definitions
    pub type_id: String,
    /// Declared constructor parameters, in order
    pub ctor_params: Vec<CtorParam>,
    /// Constructor closure
    pub construct: ConstructFn,
    /// Declared setters/methods available for injection
    pub setters: Vec<Setter>,
    /// Aware-capability injections implemented by the type
    pub aware: Vec<AwareInjection>,
}

impl TypeMetadata {
    /// Start metadata for a type with its constructor
    pub fn new<S, F>(type_id: S, construct: F) -> Self
    where
        S: Into<String>,
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            type_id: type_id.into(),
            ctor_params: Vec::new(),
            construct: Arc::new(construct),
            setters: Vec::new(),
            aware: Vec::new(),
        }
    }

    /// Declare a constructor parameter
    pub fn with_ctor_param(mut self, param: CtorParam) -> Self {
        self.ctor_params.push(param);
        self
    }

    /// Declare a setter/method applier
    pub fn with_setter<N, F>(mut self, name: N, apply: F) -> Self
    where
        N: Into<String>,
        F: Fn(&Value, Vec<Value>) -> Result<()> + Send + Sync + 'static,
    {
        self.setters.push(Setter {
            name: name.into(),
            apply: Arc::new(apply),
        });
        self
    }

    /// Declare an aware-capability injection
    pub fn with_aware<N, F>(mut self, service: N, apply: F) -> Self
    where
        N: Into<String>,
        F: Fn(&Value, Vec<Value>) -> Result<()> + Send + Sync + 'static,
    {
        self.aware.push(AwareInjection {
            service: service.into(),
            apply: Arc::new(apply),
        });
        self
    }

    /// Find a declared setter by name
    pub fn setter(&self, name: &str) -> Option<&Setter> {
        self.setters.iter().find(|s| s.name == name)
    }
}

impl fmt::Debug for TypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("type_id", &self.type_id)
            .field("ctor_params", &self.ctor_params)
            .field("setters", &self.setters.len())
            .field("aware", &self.aware.len())
            .finish()
    }
}

/// Supplies pre-computed type metadata to the resolver
pub trait MetadataProvider: Send + Sync {
    /// Metadata for a type identifier, if known
    fn type_metadata(&self, type_id: &str) -> Option<Arc<TypeMetadata>>;
}

/// Map-backed metadata provider built ahead of time
#[derive(Default)]
pub struct StaticMetadataProvider {
    types: HashMap<String, Arc<TypeMetadata>>,
}

impl StaticMetadataProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata for a type
    pub fn with_type(mut self, metadata: TypeMetadata) -> Self {
        self.types
            .insert(metadata.type_id.clone(), Arc::new(metadata));
        self
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn type_metadata(&self, type_id: &str) -> Option<Arc<TypeMetadata>> {
        self.types.get(type_id).cloned()
    }
}

/// Provider that knows no types; objects cannot be constructed
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetadataProvider;

impl NullMetadataProvider {
    /// Create a null provider
    pub fn new() -> Self {
        Self
    }
}

impl MetadataProvider for NullMetadataProvider {
    fn type_metadata(&self, _type_id: &str) -> Option<Arc<TypeMetadata>> {
        None
    }
}
