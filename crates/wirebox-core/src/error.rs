//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Wirebox container
#[derive(Error, Debug)]
pub enum Error {
    /// No definition (and no conditional match) exists for a name
    #[error("Not found: no definition registered for '{name}'")]
    NotFound {
        /// The service name that could not be resolved
        name: String,
    },

    /// A dependency graph references itself
    #[error("Circular dependency: {}", chain.join(" -> "))]
    CircularDependency {
        /// The full resolution chain, ending at the repeated name
        chain: Vec<String>,
    },

    /// Malformed definition, unresolvable autowire parameter, or
    /// predicate evaluation failure
    #[error("Definition error: {message}")]
    Definition {
        /// Description of the definition error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request-scoped entry accessed outside an active request lifecycle
    #[error("Scope violation for '{name}': {message}")]
    ScopeViolation {
        /// The request-scoped service name
        name: String,
        /// Description of the lifecycle violation
        message: String,
    },

    /// Configuration-related error (loader, logging bootstrap)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a circular dependency error from the accumulated chain
    pub fn circular(chain: Vec<String>) -> Self {
        Self::CircularDependency { chain }
    }

    /// Create a definition error
    pub fn definition<S: Into<String>>(message: S) -> Self {
        Self::Definition {
            message: message.into(),
            source: None,
        }
    }

    /// Create a definition error with source
    pub fn definition_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Definition {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a scope violation error
    pub fn scope_violation<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::ScopeViolation {
            name: name.into(),
            message: message.into(),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error (simple)
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
