//! Conditional binding evaluator
//!
//! A name may carry an ordered list of (predicate, definition) pairs.
//! Predicates are evaluated in reverse registration order (last
//! registered wins) against the live container; the first match is
//! memoized permanently for that name. Until a match happens, lookups
//! re-evaluate on every call, so a name can remain unresolved while
//! container state is still being assembled.

use std::sync::Arc;

use dashmap::DashMap;
use wirebox_core::definition::Definition;
use wirebox_core::error::{Error, Result};

use crate::container::Container;

/// Predicate over container state gating a conditional binding
pub type Predicate = Arc<dyn Fn(&Container) -> Result<bool> + Send + Sync>;

struct Slot {
    /// Candidates in registration order
    candidates: Vec<(Predicate, Definition)>,
    /// Permanently bound definition once a predicate has matched
    matched: Option<Definition>,
}

/// Per-name conditional bindings with permanent match memoization
#[derive(Clone, Default)]
pub struct ConditionalBindings {
    slots: Arc<DashMap<String, Slot>>,
}

impl ConditionalBindings {
    /// Create an empty evaluator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conditional candidate for a name
    pub fn register(&self, name: &str, predicate: Predicate, definition: Definition) -> Result<()> {
        definition.validate()?;
        self.slots
            .entry(name.to_string())
            .or_insert_with(|| Slot {
                candidates: Vec::new(),
                matched: None,
            })
            .candidates
            .push((predicate, definition));
        tracing::trace!(name, "conditional binding registered");
        Ok(())
    }

    /// Whether any conditional candidates exist for a name
    pub fn has(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Drop all conditional candidates (and any memoized match) for a name
    pub fn remove(&self, name: &str) {
        self.slots.remove(name);
    }

    /// Effective definition for a name, if any predicate matches
    ///
    /// Candidate snapshots are taken before evaluation so predicates
    /// are free to call `has`/`get` on the container without holding
    /// internal locks. A predicate error aborts the lookup with a
    /// definition error.
    pub fn effective(&self, name: &str, container: &Container) -> Result<Option<Definition>> {
        let snapshot = {
            let Some(slot) = self.slots.get(name) else {
                return Ok(None);
            };
            if let Some(matched) = &slot.matched {
                return Ok(Some(matched.clone()));
            }
            slot.candidates.clone()
        };

        // Reverse registration order: last registered wins.
        for (predicate, definition) in snapshot.iter().rev() {
            match predicate(container) {
                Ok(true) => {
                    if let Some(mut slot) = self.slots.get_mut(name) {
                        if slot.matched.is_none() {
                            slot.matched = Some(definition.clone());
                            tracing::debug!(name, "conditional binding matched and memoized");
                        }
                    }
                    return Ok(Some(definition.clone()));
                }
                Ok(false) => {}
                Err(e) => {
                    return Err(Error::definition_with_source(
                        format!("conditional predicate for '{name}' failed"),
                        e,
                    ));
                }
            }
        }
        Ok(None)
    }
}
