//! Concurrent binding storage for a single container
//!
//! Uses DashMap for lock-free concurrent access. Lookups hand out a cloned
//! `Arc<Binding>` so no shard lock is held while an instance is materialized.

use crate::binding::Binding;
use crate::token::Token;
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Map from token to binding, owned by exactly one container
pub struct BindingRegistry {
    bindings: DashMap<Token, Arc<Binding>, RandomState>,
}

impl BindingRegistry {
    /// Create new empty storage with optimized shard count.
    ///
    /// Default DashMap uses num_cpus * 4 shards which is overkill for
    /// typical containers with a few dozen bindings.
    #[inline]
    pub fn new() -> Self {
        Self {
            bindings: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Insert or replace the binding for its token
    #[inline]
    pub fn register(&self, binding: Binding) -> Option<Arc<Binding>> {
        self.bindings
            .insert(binding.token().clone(), Arc::new(binding))
    }

    /// Look up a binding
    #[inline]
    pub fn get(&self, token: &Token) -> Option<Arc<Binding>> {
        self.bindings.get(token).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a binding exists
    #[inline]
    pub fn has(&self, token: &Token) -> bool {
        self.bindings.contains_key(token)
    }

    /// Remove a binding, returning it if one was present
    #[inline]
    pub fn remove(&self, token: &Token) -> Option<Arc<Binding>> {
        self.bindings.remove(token).map(|(_, binding)| binding)
    }

    /// Point-in-time snapshot of every binding
    pub fn all(&self) -> HashMap<Token, Arc<Binding>> {
        self.bindings
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// Number of bindings
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingKind;

    #[test]
    fn test_register_and_get() {
        let registry = BindingRegistry::new();
        let token = Token::from("Config");

        assert!(registry.get(&token).is_none());
        registry.register(Binding::new("Config", BindingKind::Value).with_value(42i32));

        let binding = registry.get(&token).unwrap();
        assert_eq!(binding.kind(), BindingKind::Value);
        assert!(registry.has(&token));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_replaces() {
        let registry = BindingRegistry::new();
        registry.register(Binding::new("Config", BindingKind::Value));
        let previous = registry.register(Binding::new("Config", BindingKind::Factory));

        assert_eq!(previous.unwrap().kind(), BindingKind::Value);
        assert_eq!(
            registry.get(&Token::from("Config")).unwrap().kind(),
            BindingKind::Factory
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_and_snapshot() {
        let registry = BindingRegistry::new();
        registry.register(Binding::new("A", BindingKind::Value));
        registry.register(Binding::new("B", BindingKind::Value));

        let snapshot = registry.all();
        assert!(registry.remove(&Token::from("A")).is_some());
        assert!(registry.remove(&Token::from("A")).is_none());

        // The snapshot is unaffected by later mutation
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
