//! Declarative definition model
//!
//! A [`Definition`] is a recipe for producing a value. Definitions are
//! tagged variants with builder constructors; the container dispatches
//! on the variant at resolution time. Structural validation happens at
//! registration via [`Definition::validate`] so malformed recipes are
//! rejected before the first resolution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Factory function invoked with its resolved parameters
pub type FactoryFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A dependency reference inside a definition: either an inline
/// definition or a named reference resolved through the container
#[derive(Clone)]
pub enum Binding {
    /// Inline definition resolved in place (never cached by name)
    Definition(Box<Definition>),
    /// Named reference resolved through the container
    Ref(String),
}

impl Binding {
    /// Named reference to another entry
    pub fn reference<S: Into<String>>(name: S) -> Self {
        Self::Ref(name.into())
    }

    /// Inline literal value
    pub fn value<T: Send + Sync + 'static>(v: T) -> Self {
        Self::Definition(Box::new(Definition::value(v)))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(d) => f.debug_tuple("Definition").field(d).finish(),
            Self::Ref(name) => f.debug_tuple("Ref").field(name).finish(),
        }
    }
}

/// Factory definition: a function plus its parameter bindings
#[derive(Clone)]
pub struct FactoryDefinition {
    /// The factory function
    pub factory: FactoryFn,
    /// Parameter bindings resolved before invocation, in order
    pub params: Vec<Binding>,
}

/// Method injection applied to a constructed instance
#[derive(Debug, Clone)]
pub struct MethodInjection {
    /// Setter/method name declared in the type metadata
    pub method: String,
    /// Argument bindings resolved before the call, in order
    pub args: Vec<Binding>,
}

/// Object definition: construct an instance of a registered type
#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    /// Type identifier looked up in the metadata provider
    pub type_id: String,
    /// Lifecycle scope for the constructed instance
    pub scope: Scope,
    /// Explicit constructor argument bindings, keyed by parameter name.
    /// Parameters without an explicit binding are autowired.
    pub ctor_args: HashMap<String, Binding>,
    /// Property injections applied after construction, in order
    pub properties: Vec<(String, Binding)>,
    /// Method injections applied after properties, in registration order
    pub methods: Vec<MethodInjection>,
}

impl ObjectDefinition {
    /// Start an object definition for the given type identifier
    pub fn new<S: Into<String>>(type_id: S) -> Self {
        Self {
            type_id: type_id.into(),
            scope: Scope::default(),
            ctor_args: HashMap::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the lifecycle scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Bind a constructor parameter explicitly
    pub fn with_ctor_arg<S: Into<String>>(mut self, param: S, binding: Binding) -> Self {
        self.ctor_args.insert(param.into(), binding);
        self
    }

    /// Add a property injection
    pub fn with_property<S: Into<String>>(mut self, property: S, binding: Binding) -> Self {
        self.properties.push((property.into(), binding));
        self
    }

    /// Add a method injection
    pub fn with_method<S: Into<String>>(mut self, method: S, args: Vec<Binding>) -> Self {
        self.methods.push(MethodInjection {
            method: method.into(),
            args,
        });
        self
    }
}

/// Declarative recipe for producing a value
#[derive(Clone)]
pub enum Definition {
    /// Literal value returned as-is
    Value(Value),
    /// Indirection to another entry
    Alias(String),
    /// Invoke a function with resolved parameters
    Factory(FactoryDefinition),
    /// Construct an instance with autowiring and injections
    Object(ObjectDefinition),
    /// Aggregate of definitions, order preserved
    Array(Vec<Definition>),
    /// Process environment lookup with optional default
    Env {
        /// Environment variable name
        var: String,
        /// Fallback when the variable is unset
        default: Option<String>,
    },
    /// String with `{name}` placeholders resolved recursively
    Template(String),
}

impl Definition {
    /// Literal value definition
    pub fn value<T: Send + Sync + 'static>(v: T) -> Self {
        Self::Value(Arc::new(v))
    }

    /// Literal definition from an already-shared value
    pub fn shared(v: Value) -> Self {
        Self::Value(v)
    }

    /// Alias to another entry
    pub fn alias<S: Into<String>>(target: S) -> Self {
        Self::Alias(target.into())
    }

    /// Factory definition with parameter bindings
    pub fn factory<F>(f: F, params: Vec<Binding>) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Factory(FactoryDefinition {
            factory: Arc::new(f),
            params,
        })
    }

    /// Object definition
    pub fn object(def: ObjectDefinition) -> Self {
        Self::Object(def)
    }

    /// Array definition
    pub fn array(items: Vec<Definition>) -> Self {
        Self::Array(items)
    }

    /// Environment lookup without default
    pub fn env<S: Into<String>>(var: S) -> Self {
        Self::Env {
            var: var.into(),
            default: None,
        }
    }

    /// Environment lookup with default
    pub fn env_with_default<S: Into<String>, D: Into<String>>(var: S, default: D) -> Self {
        Self::Env {
            var: var.into(),
            default: Some(default.into()),
        }
    }

    /// String template with `{name}` placeholders
    pub fn template<S: Into<String>>(template: S) -> Self {
        Self::Template(template.into())
    }

    /// Effective lifecycle scope of this definition
    pub fn scope(&self) -> Scope {
        match self {
            Self::Object(obj) => obj.scope,
            _ => Scope::Singleton,
        }
    }

    /// Check structural validity, recursing into aggregates
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Value(_) | Self::Factory(_) => Ok(()),
            Self::Alias(target) => {
                if target.is_empty() {
                    return Err(Error::definition("alias target must not be empty"));
                }
                Ok(())
            }
            Self::Object(obj) => {
                if obj.type_id.is_empty() {
                    return Err(Error::definition("object type id must not be empty"));
                }
                Ok(())
            }
            Self::Array(items) => {
                for item in items {
                    item.validate()?;
                }
                Ok(())
            }
            Self::Env { var, .. } => {
                if var.is_empty() {
                    return Err(Error::definition(
                        "environment variable name must not be empty",
                    ));
                }
                Ok(())
            }
            Self::Template(template) => {
                parse_template(template).map(|_| ())
            }
        }
    }
}

// Closures make a derived Debug impossible; print the shape instead.
impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(..)"),
            Self::Alias(target) => write!(f, "Alias({target})"),
            Self::Factory(fd) => write!(f, "Factory({} params)", fd.params.len()),
            Self::Object(obj) => write!(f, "Object({}, {:?})", obj.type_id, obj.scope),
            Self::Array(items) => write!(f, "Array({} items)", items.len()),
            Self::Env { var, default } => write!(f, "Env({var}, default={default:?})"),
            Self::Template(t) => write!(f, "Template({t:?})"),
        }
    }
}

/// A parsed template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal text copied verbatim
    Literal(String),
    /// `{name}` placeholder resolved through the container
    Placeholder(String),
}

/// Parse a `{name}` placeholder template into segments
///
/// Fails with a definition error on unbalanced braces or empty
/// placeholder names.
pub fn parse_template(template: &str) -> Result<Vec<TemplateSegment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => {
                            return Err(Error::definition(format!(
                                "unbalanced '{{' in template {template:?}"
                            )));
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(Error::definition(format!(
                                "unterminated placeholder in template {template:?}"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(Error::definition(format!(
                        "empty placeholder in template {template:?}"
                    )));
                }
                if !literal.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(TemplateSegment::Placeholder(name));
            }
            '}' => {
                return Err(Error::definition(format!(
                    "unbalanced '}}' in template {template:?}"
                )));
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(TemplateSegment::Literal(literal));
    }
    Ok(segments)
}
