//! Lifecycle scope policies

use serde::{Deserialize, Serialize};

/// Lifecycle/caching policy for a resolved entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance for the lifetime of the container
    #[default]
    Singleton,
    /// One lazily-built instance per request lifecycle
    Request,
    /// A fresh instance on every resolution
    Prototype,
}
