//! Resolution observer hooks
//!
//! Observers are notified before and after each named resolution, for
//! tracing and diagnostics. They receive the name only and cannot
//! alter the resolution outcome.

use crate::container::Container;

/// Hook notified around each named resolution
pub trait ResolveObserver: Send + Sync {
    /// Called before a name is resolved
    fn before_resolve(&self, _name: &str) {}

    /// Called after a name resolved (`ok = true`) or failed
    fn after_resolve(&self, _name: &str, _ok: bool) {}
}

/// Stock observer emitting `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Create a tracing observer
    pub fn new() -> Self {
        Self
    }
}

impl ResolveObserver for TracingObserver {
    fn before_resolve(&self, name: &str) {
        tracing::trace!(name, "resolving");
    }

    fn after_resolve(&self, name: &str, ok: bool) {
        if ok {
            tracing::trace!(name, "resolved");
        } else {
            tracing::debug!(name, "resolution failed");
        }
    }
}

pub(crate) fn notify_before(container: &Container, name: &str) {
    for observer in container.observers() {
        observer.before_resolve(name);
    }
}

pub(crate) fn notify_after(container: &Container, name: &str, ok: bool) {
    for observer in container.observers() {
        observer.after_resolve(name, ok);
    }
}
