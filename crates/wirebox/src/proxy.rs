//! Lazy request-scope proxy
//!
//! Request-scoped entries resolve to a stable [`LazyProxy`] handle
//! whose real construction is deferred to first use. The upgrade from
//! not-yet-initialized to initialized is one-way and idempotent: the
//! first `get` runs the initializer exactly once, every later call
//! passes through to the held instance. Forcing a proxy while no
//! request lifecycle is active is a scope violation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use wirebox_core::error::{Error, Result};
use wirebox_core::value::{downcast, Value};

type InitFn = Box<dyn FnOnce() -> Result<Value> + Send>;

/// Shared request-lifecycle flag, toggled by
/// `start_request` / `end_request`
#[derive(Debug, Default)]
pub(crate) struct RequestState {
    active: AtomicBool,
}

impl RequestState {
    pub(crate) fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Placeholder for a request-scoped instance with deferred construction
pub struct LazyProxy {
    name: String,
    state: Arc<RequestState>,
    cell: OnceLock<Value>,
    init: Mutex<Option<InitFn>>,
}

impl LazyProxy {
    pub(crate) fn new<F>(name: String, state: Arc<RequestState>, init: F) -> Self
    where
        F: FnOnce() -> Result<Value> + Send + 'static,
    {
        Self {
            name,
            state,
            cell: OnceLock::new(),
            init: Mutex::new(Some(Box::new(init))),
        }
    }

    /// The service name this proxy stands in for
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the real instance has been constructed
    pub fn initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The real instance, constructing it on first use
    ///
    /// Fails with a scope violation when forced outside an active
    /// request lifecycle.
    pub fn get(&self) -> Result<Value> {
        if let Some(v) = self.cell.get() {
            return Ok(Arc::clone(v));
        }
        if !self.state.is_active() {
            return Err(Error::scope_violation(
                &self.name,
                "request-scoped entry used outside an active request (missing start_request)",
            ));
        }
        let init = {
            let mut slot = self
                .init
                .lock()
                .map_err(|_| Error::scope_violation(&self.name, "proxy initializer poisoned"))?;
            slot.take()
        };
        match init {
            Some(init) => {
                let value = init()?;
                // Single-threaded resolution per call; a lost race just
                // means another caller initialized the same proxy.
                let _ = self.cell.set(Arc::clone(&value));
                Ok(value)
            }
            None => self.cell.get().map(Arc::clone).ok_or_else(|| {
                Error::scope_violation(&self.name, "proxy initializer already consumed")
            }),
        }
    }
}

impl fmt::Debug for LazyProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProxy")
            .field("name", &self.name)
            .field("initialized", &self.initialized())
            .finish()
    }
}

/// Unwrap a resolved value that may be a request-scope proxy
///
/// Non-proxy values are returned unchanged, so callers can treat
/// every resolution uniformly.
pub fn force(value: &Value) -> Result<Value> {
    match downcast::<LazyProxy>(value) {
        Some(proxy) => proxy.get(),
        None => Ok(Arc::clone(value)),
    }
}

/// Request-scope cache: name → proxy, reset between requests
#[derive(Default)]
pub(crate) struct RequestScope {
    pub(crate) state: Arc<RequestState>,
    cache: Mutex<HashMap<String, Arc<LazyProxy>>>,
}

impl RequestScope {
    pub(crate) fn get(&self, name: &str) -> Option<Arc<LazyProxy>> {
        self.cache.lock().ok()?.get(name).cloned()
    }

    pub(crate) fn insert(&self, name: String, proxy: Arc<LazyProxy>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name, proxy);
        }
    }

    pub(crate) fn remove(&self, name: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(name);
        }
    }

    pub(crate) fn start(&self) {
        self.state.activate();
    }

    pub(crate) fn end(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
        self.state.deactivate();
    }
}
