//! Definition loading from configuration
//!
//! Declarative definitions (literal values, aliases, environment
//! lookups, string templates) can come from a TOML file merged with
//! `WIREBOX_`-prefixed environment variables. Factory and object
//! definitions carry closures and are always registered in code.
//!
//! Sources are merged in this order (later overrides earlier):
//! 1. Defaults (`DefinitionsConfig::default()`)
//! 2. TOML definitions file (if present)
//! 3. Environment variables (e.g. `WIREBOX_VALUES_GREETING=hi`)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use wirebox_core::constants::CONFIG_ENV_PREFIX;
use wirebox_core::definition::Definition;
use wirebox_core::error::{Error, Result};

use crate::container::Container;

/// Environment lookup entry in a definitions file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvVarEntry {
    /// Environment variable to read
    pub var: String,
    /// Fallback when the variable is unset
    #[serde(default)]
    pub default: Option<String>,
}

/// Declarative definitions parsed from configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    /// Literal values, stored as JSON payloads
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    /// Alias → target indirections
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Environment lookups
    #[serde(default)]
    pub env: BTreeMap<String, EnvVarEntry>,
    /// String templates with `{name}` placeholders
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl DefinitionsConfig {
    /// Register every declared definition into a container
    ///
    /// Returns the number of registered entries. Registration order is
    /// values, env lookups, aliases, templates; order does not affect
    /// resolution since references are resolved lazily.
    pub fn register_into(&self, container: &Container) -> Result<usize> {
        let mut count = 0;
        for (name, v) in &self.values {
            container.register(name, Definition::value(v.clone()))?;
            count += 1;
        }
        for (name, entry) in &self.env {
            let def = match &entry.default {
                Some(d) => Definition::env_with_default(&entry.var, d),
                None => Definition::env(&entry.var),
            };
            container.register(name, def)?;
            count += 1;
        }
        for (name, target) in &self.aliases {
            container.register(name, Definition::alias(target))?;
            count += 1;
        }
        for (name, template) in &self.templates {
            container.register(name, Definition::template(template))?;
            count += 1;
        }
        tracing::info!(count, "definitions registered from configuration");
        Ok(count)
    }
}

/// Loader merging a definitions file with environment overrides
#[derive(Clone)]
pub struct DefinitionsLoader {
    /// Definitions file path
    config_path: Option<PathBuf>,
    /// Environment prefix
    env_prefix: String,
}

impl DefinitionsLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the definitions file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load definitions from all sources
    pub fn load(&self) -> Result<DefinitionsConfig> {
        let mut figment =
            Figment::new().merge(Serialized::defaults(DefinitionsConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                tracing::info!(path = %config_path.display(), "definitions file loaded");
            } else {
                tracing::warn!(path = %config_path.display(), "definitions file not found");
            }
        }

        // Nested keys use underscore separators, e.g. WIREBOX_VALUES_GREETING.
        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        figment
            .extract()
            .map_err(|e| Error::configuration_with_source("failed to load definitions", e))
    }

    /// Load definitions and register them into a container
    pub fn load_into(&self, container: &Container) -> Result<usize> {
        self.load()?.register_into(container)
    }
}

impl Default for DefinitionsLoader {
    fn default() -> Self {
        Self::new()
    }
}
