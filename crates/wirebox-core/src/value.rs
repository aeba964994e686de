//! Opaque value currency for resolved services
//!
//! Every resolved entry is an `Arc<dyn Any + Send + Sync>`: containers
//! hand out shared handles and callers downcast at the edges. Display
//! conversion exists so string templates can substitute scalar values.

use std::any::Any;
use std::sync::Arc;

/// A resolved service instance, shared by reference
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wrap a concrete value for registration or return from a factory
pub fn value<T: Send + Sync + 'static>(v: T) -> Value {
    Arc::new(v)
}

/// Downcast a resolved value to a concrete shared type
pub fn downcast<T: Send + Sync + 'static>(v: &Value) -> Option<Arc<T>> {
    Arc::clone(v).downcast::<T>().ok()
}

/// Render a resolved value as a string for template substitution
///
/// Covers Rust scalars, `String`, and `serde_json::Value` payloads
/// (the shape produced by the configuration loader). Returns `None`
/// for values with no sensible string form.
pub fn display_value(v: &Value) -> Option<String> {
    if let Some(s) = v.downcast_ref::<String>() {
        return Some(s.clone());
    }
    if let Some(s) = v.downcast_ref::<&'static str>() {
        return Some((*s).to_string());
    }
    if let Some(b) = v.downcast_ref::<bool>() {
        return Some(b.to_string());
    }
    if let Some(n) = v.downcast_ref::<i32>() {
        return Some(n.to_string());
    }
    if let Some(n) = v.downcast_ref::<i64>() {
        return Some(n.to_string());
    }
    if let Some(n) = v.downcast_ref::<u32>() {
        return Some(n.to_string());
    }
    if let Some(n) = v.downcast_ref::<u64>() {
        return Some(n.to_string());
    }
    if let Some(n) = v.downcast_ref::<usize>() {
        return Some(n.to_string());
    }
    if let Some(n) = v.downcast_ref::<f64>() {
        return Some(n.to_string());
    }
    if let Some(j) = v.downcast_ref::<serde_json::Value>() {
        return match j {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        };
    }
    None
}
