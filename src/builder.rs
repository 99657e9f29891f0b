//! Fluent binding builders returned by [`Container::bind`]

use crate::binding::{Binding, BindingKind};
use crate::container::Container;
use crate::factory::{Factory, Instance};
use crate::provider::Constructible;
use crate::scope::Lifetime;
use crate::token::{Token, TypeKey};
use crate::{Injectable, Result};
use std::sync::Arc;

#[cfg(feature = "async")]
use std::future::Future;

/// First step of a binding: choose what the token resolves to.
///
/// # Examples
///
/// ```rust
/// use bindery::Container;
///
/// struct Config {
///     api_url: String,
/// }
///
/// let container = Container::new();
///
/// // Values register immediately and are shared
/// container.bind("Config").to_value(Config { api_url: "https://x".into() });
///
/// // Factories pick a scope next (transient when none is chosen)
/// container
///     .bind("request-id")
///     .to_factory(|_| Ok(42u64))
///     .in_request_scope();
///
/// assert_eq!(container.resolve::<Config>("Config").unwrap().api_url, "https://x");
/// ```
#[must_use = "a binding is only registered once a target is chosen"]
pub struct BindingBuilder {
    container: Container,
    token: Token,
}

impl BindingBuilder {
    pub(crate) fn new(container: Container, token: Token) -> Self {
        Self { container, token }
    }

    /// The token being bound
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Bind to a value, shared by every resolve
    pub fn to_value<T: Injectable>(self, value: T) {
        self.to_arc(Arc::new(value));
    }

    /// Bind to an already shared value; resolves return this exact `Arc`
    pub fn to_arc<T: Injectable>(self, value: Arc<T>) {
        let binding = Binding::new(self.token, BindingKind::Value)
            .with_instance(value as Instance)
            .with_lifetime(Lifetime::Singleton);
        self.container.register_binding(binding);
    }

    /// Bind to a factory called with the container that owns the binding
    pub fn to_factory<T, F>(self, factory: F) -> ScopeBuilder
    where
        T: Injectable,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        let binding =
            Binding::new(self.token, BindingKind::Factory).with_factory(Factory::new(factory));
        ScopeBuilder::new(self.container, binding)
    }

    /// Bind to an asynchronous factory; only `resolve_async` can produce it
    #[cfg(feature = "async")]
    pub fn to_async_factory<T, F, Fut>(self, factory: F) -> ScopeBuilder
    where
        T: Injectable,
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let binding = Binding::new(self.token, BindingKind::Factory)
            .with_factory(Factory::new_async(factory));
        ScopeBuilder::new(self.container, binding)
    }

    /// Bind to a constructed `T`, describing it in the container's registry
    pub fn to_constructed<T: Constructible>(self) -> ScopeBuilder {
        let ty = self.container.injectables().describe::<T>();
        self.to_type(ty)
    }

    /// Bind to an already described type
    pub fn to_type(self, ty: TypeKey) -> ScopeBuilder {
        let binding = Binding::new(self.token, BindingKind::Constructed).with_implementation(ty);
        ScopeBuilder::new(self.container, binding)
    }
}

/// Final step of a binding: choose its lifetime.
///
/// Dropping the builder without choosing registers the binding as transient.
pub struct ScopeBuilder {
    container: Container,
    binding: Option<Binding>,
}

impl ScopeBuilder {
    fn new(container: Container, binding: Binding) -> Self {
        Self {
            container,
            binding: Some(binding),
        }
    }

    /// One instance for the owning container
    pub fn in_singleton_scope(self) {
        self.in_lifetime(Lifetime::Singleton);
    }

    /// A new instance per resolve
    pub fn in_transient_scope(self) {
        self.in_lifetime(Lifetime::Transient);
    }

    /// One instance per resolution tree
    pub fn in_request_scope(self) {
        self.in_lifetime(Lifetime::Request);
    }

    pub fn in_lifetime(mut self, lifetime: Lifetime) {
        if let Some(binding) = self.binding.take() {
            self.container
                .register_binding(binding.with_lifetime(lifetime));
        }
    }
}

impl Drop for ScopeBuilder {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            self.container.register_binding(binding);
        }
    }
}
