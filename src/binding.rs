//! Bindings: registered recipes for producing an instance for a token

use crate::factory::{Factory, Instance};
use crate::scope::Lifetime;
use crate::token::{Token, TypeKey};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a binding produces its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A pre-built instance
    Value,
    /// A function of the container
    Factory,
    /// A type built from its descriptor
    Constructed,
}

/// A registered recipe for a token.
///
/// Payloads are optional so a binding can be registered before it is
/// complete; a kind whose payload is missing fails at resolve time with
/// [`DiError::MissingBindingPayload`](crate::DiError::MissingBindingPayload).
///
/// # Examples
///
/// ```rust
/// use bindery::{Binding, BindingKind, Container, Lifetime};
///
/// let container = Container::new();
/// container.register_binding(
///     Binding::new("port", BindingKind::Value)
///         .with_value(8080u16)
///         .with_lifetime(Lifetime::Singleton),
/// );
///
/// assert_eq!(*container.resolve::<u16>("port").unwrap(), 8080);
/// ```
pub struct Binding {
    id: u64,
    token: Token,
    kind: BindingKind,
    lifetime: Lifetime,
    value: Option<Instance>,
    factory: Option<Factory>,
    implementation: Option<TypeKey>,
    /// Singleton slot, filled on first resolution
    cached: OnceCell<Instance>,
    /// Single-flight guard for asynchronous singleton initialization
    #[cfg(feature = "async")]
    init_lock: tokio::sync::Mutex<()>,
}

impl Binding {
    /// Create an empty binding of the given kind with the default (transient) lifetime
    pub fn new(token: impl Into<Token>, kind: BindingKind) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            token: token.into(),
            kind,
            lifetime: Lifetime::default(),
            value: None,
            factory: None,
            implementation: None,
            cached: OnceCell::new(),
            #[cfg(feature = "async")]
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Set the lifetime
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Set the value payload
    pub fn with_value<T: crate::Injectable>(self, value: T) -> Self {
        self.with_instance(std::sync::Arc::new(value))
    }

    /// Set the value payload from an already shared instance
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.value = Some(instance);
        self
    }

    /// Set the factory payload
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the constructed-type payload
    pub fn with_implementation(mut self, implementation: TypeKey) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// The token this binding answers for
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// How the instance is produced
    #[inline]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Lifecycle policy
    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// The constructed type, if any
    #[inline]
    pub fn implementation(&self) -> Option<TypeKey> {
        self.implementation
    }

    /// The cached singleton instance, if one has been produced
    #[inline]
    pub fn cached_instance(&self) -> Option<Instance> {
        self.cached.get().cloned()
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<&Instance> {
        self.value.as_ref()
    }

    #[inline]
    pub(crate) fn factory(&self) -> Option<&Factory> {
        self.factory.as_ref()
    }

    #[inline]
    pub(crate) fn cache(&self) -> &OnceCell<Instance> {
        &self.cached
    }

    /// Store `instance` as the singleton unless another caller got there first.
    ///
    /// Returns whichever instance ended up in the slot.
    pub(crate) fn publish(&self, instance: Instance) -> Instance {
        match self.cached.try_insert(instance) {
            Ok(stored) => stored.clone(),
            Err((existing, _)) => existing.clone(),
        }
    }

    #[cfg(feature = "async")]
    #[inline]
    pub(crate) fn init_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.init_lock
    }

    /// Process-unique id, never reused by a later binding
    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("token", &self.token)
            .field("kind", &self.kind)
            .field("lifetime", &self.lifetime)
            .field("cached", &self.cached.get().is_some())
            .finish()
    }
}
