//! Resolver dispatch, cycle guard, and scope policy
//!
//! One top-level `get`/`make` call owns a [`Frame`]: the chain of
//! names currently being resolved (the cycle guard) and a memo table
//! that makes diamond dependencies share one instance per traversal,
//! prototype scope included. The frame is allocated per call and
//! dropped on every exit path, so a failed resolution never poisons a
//! later independent call.

use std::collections::HashMap;
use std::sync::Arc;

use wirebox_core::constants::normalize;
use wirebox_core::definition::{
    parse_template, Binding, Definition, FactoryDefinition, ObjectDefinition, TemplateSegment,
};
use wirebox_core::error::{Error, Result};
use wirebox_core::scope::Scope;
use wirebox_core::value::{display_value, value, Value};

use crate::container::{Bypass, Container, Overrides};
use crate::observer::{notify_after, notify_before};
use crate::proxy::LazyProxy;

/// Call-local resolution state: cycle chain + diamond memo
#[derive(Default)]
pub(crate) struct Frame {
    /// Names currently being resolved, outermost first
    chain: Vec<String>,
    /// Values produced during this traversal, shared on re-reference
    memo: HashMap<String, Value>,
}

impl Container {
    /// Resolve a (possibly unnormalized) name within a frame
    pub(crate) fn resolve_entry(
        &self,
        raw: &str,
        frame: &mut Frame,
        bypass: Option<&Bypass>,
    ) -> Result<Value> {
        let name = normalize(raw).to_string();
        if name.is_empty() {
            return Err(Error::not_found(raw));
        }

        notify_before(self, &name);
        let result = self.resolve_named(&name, frame, bypass);
        notify_after(self, &name, result.is_ok());
        result
    }

    fn resolve_named(
        &self,
        name: &str,
        frame: &mut Frame,
        bypass: Option<&Bypass>,
    ) -> Result<Value> {
        let bypassed = bypass.is_some_and(|b| b.name == name);

        if !bypassed {
            if let Some(v) = frame.memo.get(name) {
                return Ok(Arc::clone(v));
            }
            if let Some(v) = self.inner.singletons.get(name) {
                tracing::trace!(name, "singleton cache hit");
                return Ok(Arc::clone(v.value()));
            }
            if let Some(proxy) = self.inner.requests.get(name) {
                tracing::trace!(name, "request cache hit");
                let v: Value = proxy;
                return Ok(v);
            }
        }

        if frame.chain.iter().any(|n| n == name) {
            let mut chain = frame.chain.clone();
            chain.push(name.to_string());
            return Err(Error::circular(chain));
        }

        let definition = self.effective_definition(name)?;

        // Request scope defers real construction behind a stable proxy.
        if definition.scope() == Scope::Request && !bypassed {
            let proxy = self.request_proxy(name, definition);
            self.inner.requests.insert(name.to_string(), Arc::clone(&proxy));
            let v: Value = proxy;
            frame.memo.insert(name.to_string(), Arc::clone(&v));
            return Ok(v);
        }

        frame.chain.push(name.to_string());
        let overrides = if bypassed {
            bypass.map(|b| &b.overrides)
        } else {
            None
        };
        let resolved = self.dispatch(&definition, frame, overrides)?;
        frame.chain.pop();

        if bypassed {
            // `make` never caches the requested name.
            return Ok(resolved);
        }

        frame.memo.insert(name.to_string(), Arc::clone(&resolved));
        match definition.scope() {
            Scope::Prototype | Scope::Request => Ok(resolved),
            Scope::Singleton => {
                let winner = self
                    .inner
                    .singletons
                    .entry(name.to_string())
                    .or_insert(resolved)
                    .value()
                    .clone();
                Ok(winner)
            }
        }
    }

    fn effective_definition(&self, name: &str) -> Result<Definition> {
        if let Some(def) = self.inner.conditional.effective(name, self)? {
            return Ok(def);
        }
        self.inner
            .registry
            .get(name)
            .ok_or_else(|| Error::not_found(name))
    }

    fn request_proxy(&self, name: &str, definition: Definition) -> Arc<LazyProxy> {
        let container = self.clone();
        let init_name = name.to_string();
        let state = Arc::clone(&self.inner.requests.state);
        Arc::new(LazyProxy::new(name.to_string(), state, move || {
            // First use runs outside the original call; fresh frame,
            // with the entry itself on the chain.
            let mut frame = Frame::default();
            frame.chain.push(init_name.clone());
            container.dispatch(&definition, &mut frame, None)
        }))
    }

    fn dispatch(
        &self,
        definition: &Definition,
        frame: &mut Frame,
        overrides: Option<&Overrides>,
    ) -> Result<Value> {
        if let Some(ov) = overrides {
            if !ov.is_empty() && !matches!(definition, Definition::Object(_)) {
                return Err(Error::definition(
                    "constructor overrides require an object definition",
                ));
            }
        }

        match definition {
            Definition::Value(v) => Ok(Arc::clone(v)),
            // Alias cycles run through the same frame, so they are
            // caught identically to object cycles.
            Definition::Alias(target) => self.resolve_entry(target, frame, None),
            Definition::Factory(factory) => self.invoke_factory(factory, frame),
            Definition::Object(object) => self.construct_object(object, frame, overrides),
            Definition::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.dispatch(item, frame, None)?);
                }
                let v: Value = Arc::new(values);
                Ok(v)
            }
            Definition::Env { var, default } => resolve_env(var, default.as_deref()),
            Definition::Template(template) => self.expand_template(template, frame),
        }
    }

    fn resolve_binding(&self, binding: &Binding, frame: &mut Frame) -> Result<Value> {
        match binding {
            Binding::Ref(name) => self.resolve_entry(name, frame, None),
            // Inline definitions resolve in place: anonymous, never
            // cached by name.
            Binding::Definition(def) => self.dispatch(def, frame, None),
        }
    }

    fn invoke_factory(&self, factory: &FactoryDefinition, frame: &mut Frame) -> Result<Value> {
        let mut params = Vec::with_capacity(factory.params.len());
        for binding in &factory.params {
            params.push(self.resolve_binding(binding, frame)?);
        }
        (factory.factory)(&params)
    }

    fn construct_object(
        &self,
        object: &ObjectDefinition,
        frame: &mut Frame,
        overrides: Option<&Overrides>,
    ) -> Result<Value> {
        let metadata = self
            .inner
            .metadata
            .type_metadata(&object.type_id)
            .ok_or_else(|| {
                Error::definition(format!(
                    "no type metadata registered for '{}'",
                    object.type_id
                ))
            })?;

        if let Some(ov) = overrides {
            for key in ov.keys() {
                if !metadata.ctor_params.iter().any(|p| &p.name == key) {
                    return Err(Error::definition(format!(
                        "override '{}' matches no constructor parameter of '{}'",
                        key, object.type_id
                    )));
                }
            }
        }

        let mut args = Vec::with_capacity(metadata.ctor_params.len());
        for param in &metadata.ctor_params {
            let explicit = overrides
                .and_then(|ov| ov.get(&param.name))
                .or_else(|| object.ctor_args.get(&param.name));
            let arg = if let Some(binding) = explicit {
                self.resolve_binding(binding, frame)?
            } else if let Some(type_id) = &param.type_id {
                // Autowiring: the declared type names a container entry.
                if self.has(type_id) {
                    self.resolve_entry(type_id, frame, None)?
                } else if let Some(default) = &param.default {
                    Arc::clone(default)
                } else {
                    return Err(Error::definition(format!(
                        "cannot autowire parameter '{}' of '{}': no entry for type '{}' and no default",
                        param.name, object.type_id, type_id
                    )));
                }
            } else if let Some(default) = &param.default {
                Arc::clone(default)
            } else {
                return Err(Error::definition(format!(
                    "parameter '{}' of '{}' has no binding, declared type, or default",
                    param.name, object.type_id
                )));
            };
            args.push(arg);
        }

        let instance = (metadata.construct)(args)?;

        for (property, binding) in &object.properties {
            let setter = metadata.setter(property).ok_or_else(|| {
                Error::definition(format!(
                    "type '{}' declares no setter for property '{}'",
                    object.type_id, property
                ))
            })?;
            let v = self.resolve_binding(binding, frame)?;
            (setter.apply)(&instance, vec![v])?;
        }

        for injection in &object.methods {
            let setter = metadata.setter(&injection.method).ok_or_else(|| {
                Error::definition(format!(
                    "type '{}' declares no method '{}'",
                    object.type_id, injection.method
                ))
            })?;
            let mut call_args = Vec::with_capacity(injection.args.len());
            for binding in &injection.args {
                call_args.push(self.resolve_binding(binding, frame)?);
            }
            (setter.apply)(&instance, call_args)?;
        }

        // Aware injections are auto-appended after explicit methods.
        for aware in &metadata.aware {
            if self.has(&aware.service) {
                let v = self.resolve_entry(&aware.service, frame, None)?;
                (aware.apply)(&instance, vec![v])?;
            } else {
                tracing::debug!(
                    service = %aware.service,
                    type_id = %object.type_id,
                    "aware service not registered; skipping injection"
                );
            }
        }

        Ok(instance)
    }

    fn expand_template(&self, template: &str, frame: &mut Frame) -> Result<Value> {
        let segments = parse_template(template)?;
        let mut out = String::new();
        for segment in segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(&text),
                TemplateSegment::Placeholder(name) => {
                    let v = self.resolve_entry(&name, frame, None)?;
                    let rendered = display_value(&v).ok_or_else(|| {
                        Error::definition(format!(
                            "placeholder '{name}' resolved to a non-displayable value"
                        ))
                    })?;
                    out.push_str(&rendered);
                }
            }
        }
        Ok(value(out))
    }
}

fn resolve_env(var: &str, default: Option<&str>) -> Result<Value> {
    match std::env::var(var) {
        Ok(v) => Ok(value(v)),
        Err(std::env::VarError::NotPresent) => match default {
            Some(d) => Ok(value(d.to_string())),
            None => Err(Error::definition(format!(
                "environment variable '{var}' is not set and has no default"
            ))),
        },
        Err(e @ std::env::VarError::NotUnicode(_)) => Err(Error::definition_with_source(
            format!("environment variable '{var}' is not valid unicode"),
            e,
        )),
    }
}
