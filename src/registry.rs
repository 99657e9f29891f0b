//! Explicit registry of constructible types
//!
//! Holds the descriptors that constructed bindings are built from and the
//! set of types (and alternative tokens) eligible for auto-resolution. The
//! registry is an ordinary value: create one, share it between containers
//! through [`ContainerOptions`](crate::ContainerOptions), and populate it
//! before resolving. Nothing is registered implicitly.

use crate::provider::{
    Constructible, Constructor, DescriptorProvider, ParamSpec, PropertyInjection, TypeDescriptor,
};
use crate::scope::Lifetime;
use crate::token::{Token, TypeKey};
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Registration options for an auto-resolvable type
#[derive(Debug, Clone, Default)]
pub struct InjectableOptions {
    /// Lifetime for auto-created bindings; the container default when `None`
    pub lifetime: Option<Lifetime>,
    /// Extra token that resolves to this type
    pub token: Option<Token>,
}

impl InjectableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn token(mut self, token: impl Into<Token>) -> Self {
        self.token = Some(token.into());
        self
    }
}

struct Entry {
    descriptor: Arc<TypeDescriptor>,
    lifetime: Option<Lifetime>,
    injectable: bool,
}

/// Descriptor store and auto-resolution table
pub struct InjectableRegistry {
    types: DashMap<TypeKey, Entry, RandomState>,
    tokens: DashMap<Token, TypeKey, RandomState>,
}

impl InjectableRegistry {
    pub fn new() -> Self {
        Self {
            types: DashMap::with_hasher(RandomState::new()),
            tokens: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Make `T` constructible without marking it for auto-resolution
    pub fn describe<T: Constructible>(&self) -> TypeKey {
        self.add_descriptor(T::descriptor())
    }

    /// Store a hand-built descriptor
    pub fn add_descriptor(&self, descriptor: TypeDescriptor) -> TypeKey {
        let key = descriptor.type_key();
        let descriptor = Arc::new(descriptor);
        self.types
            .entry(key)
            .and_modify(|entry| entry.descriptor = Arc::clone(&descriptor))
            .or_insert_with(|| Entry {
                descriptor,
                lifetime: None,
                injectable: false,
            });
        key
    }

    /// Make `T` constructible and auto-resolvable
    pub fn register<T: Constructible>(&self, options: InjectableOptions) -> TypeKey {
        self.register_descriptor(T::descriptor(), options)
    }

    /// Hand-built counterpart of [`register`](Self::register)
    pub fn register_descriptor(
        &self,
        descriptor: TypeDescriptor,
        options: InjectableOptions,
    ) -> TypeKey {
        let key = descriptor.type_key();

        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            type_name = key.name(),
            lifetime = ?options.lifetime,
            token = ?options.token,
            "Registering injectable type"
        );

        self.types.insert(
            key,
            Entry {
                descriptor: Arc::new(descriptor),
                lifetime: options.lifetime,
                injectable: true,
            },
        );
        if let Some(token) = options.token {
            self.tokens.insert(token, key);
        }
        key
    }

    /// Whether `key` is marked for auto-resolution
    pub fn is_injectable(&self, key: &TypeKey) -> bool {
        self.types.get(key).is_some_and(|entry| entry.injectable)
    }

    /// The stored descriptor for `key`
    pub fn descriptor(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.get(key).map(|entry| Arc::clone(&entry.descriptor))
    }

    /// Implementation and lifetime an unbound `token` auto-resolves to
    pub fn lookup(&self, token: &Token) -> Option<(TypeKey, Option<Lifetime>)> {
        let key = match self.tokens.get(token) {
            Some(mapped) => *mapped,
            None => token.type_key()?,
        };
        let entry = self.types.get(&key)?;
        entry.injectable.then_some((key, entry.lifetime))
    }

    /// Every token auto-resolution can satisfy: injectable type tokens and mapped tokens
    pub fn auto_tokens(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .types
            .iter()
            .filter(|entry| entry.injectable)
            .map(|entry| Token::Type(*entry.key()))
            .collect();
        tokens.extend(self.tokens.iter().map(|entry| entry.key().clone()));
        tokens
    }

    /// Number of described types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for InjectableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InjectableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectableRegistry")
            .field("types", &self.types.len())
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl DescriptorProvider for InjectableRegistry {
    fn is_constructible(&self, ty: &TypeKey) -> bool {
        self.types.contains_key(ty)
    }

    fn dependency_tokens(&self, ty: &TypeKey) -> Vec<Token> {
        self.descriptor(ty)
            .map(|d| d.params().iter().map(|p| p.token().clone()).collect())
            .unwrap_or_default()
    }

    fn optional_positions(&self, ty: &TypeKey) -> HashSet<usize> {
        self.descriptor(ty)
            .map(|d| positions(&d, |p| p.is_optional()))
            .unwrap_or_default()
    }

    fn deferred_positions(&self, ty: &TypeKey) -> HashSet<usize> {
        self.descriptor(ty)
            .map(|d| positions(&d, |p| p.is_deferred()))
            .unwrap_or_default()
    }

    fn named_positions(&self, ty: &TypeKey) -> HashMap<usize, Arc<str>> {
        self.descriptor(ty)
            .map(|d| {
                d.params()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, p)| p.name().map(|name| (i, Arc::clone(name))))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn property_injections(&self, ty: &TypeKey) -> Vec<PropertyInjection> {
        self.descriptor(ty)
            .map(|d| d.properties().to_vec())
            .unwrap_or_default()
    }

    fn constructor(&self, ty: &TypeKey) -> Option<Constructor> {
        self.descriptor(ty).map(|d| Arc::clone(d.constructor()))
    }
}

fn positions(
    descriptor: &TypeDescriptor,
    pred: impl Fn(&ParamSpec) -> bool,
) -> HashSet<usize> {
    descriptor
        .params()
        .iter()
        .enumerate()
        .filter(|(_, p)| pred(p))
        .map(|(i, _)| i)
        .collect()
}
