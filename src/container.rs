//! Hierarchical dependency container
//!
//! A `Container` owns a binding registry and optionally refers to a parent.
//! Lookups fall through to the parent chain when a token is not bound
//! locally; the closest binding wins and child operations never touch a
//! parent's registry. `Container` is a cheap handle: clones share the same
//! registry.

use crate::binding::{Binding, BindingKind};
use crate::builder::BindingBuilder;
use crate::factory::Instance;
use crate::provider::DescriptorProvider;
use crate::registry::InjectableRegistry;
use crate::resolver;
use crate::scope::Lifetime;
use crate::storage::BindingRegistry;
use crate::token::Token;
use crate::{DiError, Injectable, Result};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

// =============================================================================
// Options
// =============================================================================

/// Container configuration, inherited by child containers
#[derive(Clone)]
pub struct ContainerOptions {
    /// Bind registered injectables on demand when a token is unbound
    pub auto_resolve: bool,
    /// Lifetime for auto-registered bindings without their own
    pub default_lifetime: Lifetime,
    /// Descriptors and auto-resolution table
    pub injectables: Arc<InjectableRegistry>,
    /// Replacement descriptor source for constructed bindings
    pub provider: Option<Arc<dyn DescriptorProvider>>,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_resolve(mut self, enabled: bool) -> Self {
        self.auto_resolve = enabled;
        self
    }

    pub fn with_default_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    /// Share an existing registry
    pub fn with_injectables(mut self, injectables: Arc<InjectableRegistry>) -> Self {
        self.injectables = injectables;
        self
    }

    /// Build constructed bindings from `provider` instead of the registry
    pub fn with_provider(mut self, provider: Arc<dyn DescriptorProvider>) -> Self {
        self.provider = Some(provider);
        self
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            auto_resolve: true,
            default_lifetime: Lifetime::Singleton,
            injectables: Arc::new(InjectableRegistry::new()),
            provider: None,
        }
    }
}

impl std::fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("auto_resolve", &self.auto_resolve)
            .field("default_lifetime", &self.default_lifetime)
            .field("injectables", &self.injectables)
            .field("custom_provider", &self.provider.is_some())
            .finish()
    }
}

// =============================================================================
// Container
// =============================================================================

pub(crate) struct ContainerInner {
    pub(crate) bindings: BindingRegistry,
    /// Non-owning: a child never keeps its parent alive
    pub(crate) parent: Option<Weak<ContainerInner>>,
    pub(crate) options: ContainerOptions,
    pub(crate) depth: u32,
}

/// Dependency container.
///
/// # Examples
///
/// ```rust
/// use bindery::{Container, Token};
///
/// struct Database {
///     url: String,
/// }
///
/// let root = Container::new();
/// root.bind(Token::of::<Database>())
///     .to_factory(|_| Ok(Database { url: "postgres://prod".into() }))
///     .in_singleton_scope();
///
/// let test = root.create_child_container();
/// test.bind(Token::of::<Database>())
///     .to_value(Database { url: "sqlite::memory:".into() });
///
/// assert_eq!(root.get::<Database>().unwrap().url, "postgres://prod");
/// assert_eq!(test.get::<Database>().unwrap().url, "sqlite::memory:");
///
/// // Removing the override falls back to the parent
/// test.unbind(Token::of::<Database>());
/// assert_eq!(test.get::<Database>().unwrap().url, "postgres://prod");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Create a new root container with default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Create a new root container.
    pub fn with_options(options: ContainerOptions) -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            depth = 0,
            auto_resolve = options.auto_resolve,
            default_lifetime = %options.default_lifetime,
            "Creating new root container"
        );

        Self {
            inner: Arc::new(ContainerInner {
                bindings: BindingRegistry::new(),
                parent: None,
                options,
                depth: 0,
            }),
        }
    }

    /// Create a child container that falls back to this one.
    ///
    /// The child shares this container's options, including the injectable
    /// registry, and holds only a weak reference to it: once every handle to
    /// the parent is dropped, resolutions that need it fail with
    /// [`DiError::ParentDropped`].
    pub fn create_child_container(&self) -> Self {
        let child_depth = self.inner.depth + 1;

        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            parent_depth = self.inner.depth,
            child_depth = child_depth,
            parent_bindings = self.inner.bindings.len(),
            "Creating child container"
        );

        Self {
            inner: Arc::new(ContainerInner {
                bindings: BindingRegistry::new(),
                parent: Some(Arc::downgrade(&self.inner)),
                options: self.inner.options.clone(),
                depth: child_depth,
            }),
        }
    }

    /// The parent container, `None` for a root or a dropped parent
    pub fn parent(&self) -> Option<Container> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Container::from_inner)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Start a binding for `token`.
    ///
    /// An existing local binding for the token is replaced once the builder
    /// completes.
    #[inline]
    pub fn bind(&self, token: impl Into<Token>) -> BindingBuilder {
        BindingBuilder::new(self.clone(), token.into())
    }

    /// Unbind `token` locally, then start a new binding for it
    pub fn rebind(&self, token: impl Into<Token>) -> BindingBuilder {
        let token = token.into();
        self.unbind(&token);
        self.bind(token)
    }

    /// Remove the local binding for `token`.
    ///
    /// Returns `true` if a binding was removed. Parent bindings are never
    /// affected, so a later resolve here may fall through to them.
    pub fn unbind(&self, token: impl Into<Token>) -> bool {
        let token = token.into();
        let removed = self.inner.bindings.remove(&token).is_some();

        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            token = %token,
            removed,
            depth = self.inner.depth,
            "Unbinding token"
        );

        removed
    }

    /// Register a fully assembled binding, replacing any local one for its token.
    ///
    /// No payload validation happens here; an incomplete binding fails when
    /// it is resolved.
    pub fn register_binding(&self, binding: Binding) {
        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            token = %binding.token(),
            kind = ?binding.kind(),
            lifetime = %binding.lifetime(),
            depth = self.inner.depth,
            binding_count = self.inner.bindings.len() + 1,
            "Registering binding"
        );

        self.inner.bindings.register(binding);
    }

    /// Bind every registered injectable not already bound in the chain.
    ///
    /// Returns the number of bindings created.
    pub fn auto_register_all(&self) -> usize {
        self.inner
            .options
            .injectables
            .auto_tokens()
            .iter()
            .filter(|token| self.auto_register(token))
            .count()
    }

    fn auto_register(&self, token: &Token) -> bool {
        if !self.inner.options.auto_resolve || self.is_bound(token) {
            return false;
        }
        let Some((ty, lifetime)) = self.inner.options.injectables.lookup(token) else {
            return false;
        };
        let lifetime = lifetime.unwrap_or(self.inner.options.default_lifetime);

        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            token = %token,
            type_name = ty.name(),
            lifetime = %lifetime,
            "Auto-registering injectable"
        );

        self.inner.bindings.register(
            Binding::new(token.clone(), BindingKind::Constructed)
                .with_implementation(ty)
                .with_lifetime(lifetime),
        );
        true
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve `token` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DiError::Unbound`] if nothing in the chain binds the token,
    /// [`DiError::CircularDependency`] if the binding it reaches is already
    /// being built on this thread, [`DiError::TypeMismatch`] if the instance is not a `T`, and
    /// whatever a factory or constructor returned, unchanged.
    pub fn resolve<T: Injectable>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        let token = token.into();
        self.resolve_any(&token)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(&token))
    }

    /// Resolve `token` without a type
    pub fn resolve_any(&self, token: &Token) -> Result<Instance> {
        self.auto_register(token);
        let result = resolver::resolve(self, token);

        #[cfg(feature = "logging")]
        if let Err(err) = &result {
            if crate::scope::current_resolution().is_none() {
                debug!(
                    target: "bindery",
                    token = %token,
                    depth = self.inner.depth,
                    error = %err,
                    "Resolution failed"
                );
            }
        }

        result
    }

    /// Resolve `token`, reporting any failure as `None`
    pub fn try_resolve<T: Injectable>(&self, token: impl Into<Token>) -> Option<Arc<T>> {
        self.resolve(token).ok()
    }

    /// Resolve the type token of `T`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindery::{Container, Token};
    ///
    /// let container = Container::new();
    /// container.bind(Token::of::<u32>()).to_value(7u32);
    ///
    /// assert_eq!(*container.get::<u32>().unwrap(), 7);
    /// ```
    #[inline]
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>> {
        self.resolve(Token::of::<T>())
    }

    /// Resolve the type token of `T`, reporting any failure as `None`
    #[inline]
    pub fn try_get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.get().ok()
    }

    /// Resolve `token` as a `T`, awaiting asynchronous factories.
    ///
    /// Unlike [`resolve`](Self::resolve) the top-level token is not checked
    /// for cycles; constructed types reached from here still are.
    #[cfg(feature = "async")]
    pub async fn resolve_async<T: Injectable>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        let token = token.into();
        self.resolve_any_async(&token)
            .await?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(&token))
    }

    /// Resolve `token` without a type, awaiting asynchronous factories
    #[cfg(feature = "async")]
    pub async fn resolve_any_async(&self, token: &Token) -> Result<Instance> {
        self.auto_register(token);

        #[cfg(feature = "logging")]
        trace!(target: "bindery", token = %token, "Resolving asynchronously");

        resolver::resolve_async(self, token).await
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Check if `token` is bound here or in any ancestor
    pub fn is_bound(&self, token: impl Into<Token>) -> bool {
        let token = token.into();
        let mut current = Some(self.clone());
        while let Some(container) = current {
            if container.inner.bindings.has(&token) {
                return true;
            }
            current = container.parent();
        }
        false
    }

    /// Check if `token` is bound in this container itself
    #[inline]
    pub fn is_bound_locally(&self, token: impl Into<Token>) -> bool {
        self.inner.bindings.has(&token.into())
    }

    /// Snapshot of the local bindings
    pub fn bindings(&self) -> HashMap<Token, Arc<Binding>> {
        self.inner.bindings.all()
    }

    /// Number of local bindings
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.bindings.is_empty()
    }

    /// Distance from the root (0 for a root container)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.inner.depth
    }

    #[inline]
    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// The injectable registry shared by this container's family
    #[inline]
    pub fn injectables(&self) -> &InjectableRegistry {
        &self.inner.options.injectables
    }

    /// Descriptor source for constructed bindings
    pub(crate) fn provider(&self) -> &dyn DescriptorProvider {
        match &self.inner.options.provider {
            Some(provider) => &**provider,
            None => &*self.inner.options.injectables as &dyn DescriptorProvider,
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    #[inline]
    pub(crate) fn from_inner(inner: Arc<ContainerInner>) -> Self {
        Self { inner }
    }

    #[inline]
    pub(crate) fn downgrade(&self) -> Weak<ContainerInner> {
        Arc::downgrade(&self.inner)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.bindings.len())
            .field("depth", &self.inner.depth)
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Constructible, ParamSpec, TypeDescriptor};
    use crate::registry::InjectableOptions;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestService {
        value: String,
    }

    #[derive(Debug)]
    struct Repository;

    impl Constructible for Repository {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::builder::<Repository>().build(|_| Ok(Repository))
        }
    }

    #[derive(Debug)]
    struct UserService {
        repo: Arc<Repository>,
    }

    impl Constructible for UserService {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::builder::<UserService>()
                .param(ParamSpec::of::<Repository>())
                .build(|args| Ok(UserService { repo: args.get(0)? }))
        }
    }

    #[test]
    fn test_value_binding() {
        let container = Container::new();
        container.bind("svc").to_value(TestService {
            value: "test".into(),
        });

        let s1 = container.resolve::<TestService>("svc").unwrap();
        let s2 = container.resolve::<TestService>("svc").unwrap();

        assert_eq!(s1.value, "test");
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_unbound() {
        let container = Container::new();
        let err = container.resolve::<TestService>("svc").unwrap_err();
        assert!(matches!(err, DiError::Unbound { ref token } if token == "svc"));
        assert!(container.try_resolve::<TestService>("svc").is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let container = Container::new();
        container.bind("svc").to_value(1u8);
        assert!(matches!(
            container.resolve::<TestService>("svc"),
            Err(DiError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_child_inherits_and_overrides() {
        let root = Container::new();
        root.bind("svc").to_value(TestService {
            value: "root".into(),
        });
        root.bind("shared").to_value(1u32);

        let child = root.create_child_container();
        child.bind("svc").to_value(TestService {
            value: "child".into(),
        });

        assert_eq!(child.resolve::<TestService>("svc").unwrap().value, "child");
        assert_eq!(root.resolve::<TestService>("svc").unwrap().value, "root");
        assert_eq!(*child.resolve::<u32>("shared").unwrap(), 1);

        assert!(child.is_bound("shared"));
        assert!(!child.is_bound_locally("shared"));
        assert!(!root.is_bound_locally("missing"));
        assert_eq!(child.depth(), 1);
        assert_eq!(child.parent().unwrap().depth(), 0);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_deep_hierarchy_closest_binding_wins() {
        let root = Container::new();
        root.bind("level").to_value(0u32);

        let mut containers = vec![root.clone()];
        for depth in 1..=5u32 {
            let child = containers[containers.len() - 1].create_child_container();
            if depth % 2 == 0 {
                child.bind("level").to_value(depth);
            }
            containers.push(child);
        }

        let levels: Vec<u32> = containers
            .iter()
            .map(|c| *c.resolve::<u32>("level").unwrap())
            .collect();
        assert_eq!(levels, vec![0, 0, 2, 2, 4, 4]);

        // Unbinding the deepest override falls through to depth 2
        containers[4].unbind("level");
        assert_eq!(*containers[5].resolve::<u32>("level").unwrap(), 2);
        assert_eq!(*root.resolve::<u32>("level").unwrap(), 0);
    }

    #[test]
    fn test_rebind_replaces_cached_singleton() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .bind("n")
            .to_factory(|_| Ok(CREATED.fetch_add(1, Ordering::SeqCst)))
            .in_singleton_scope();

        let first = container.resolve::<u32>("n").unwrap();
        assert!(Arc::ptr_eq(&first, &container.resolve::<u32>("n").unwrap()));

        container.rebind("n").to_value(100u32);
        assert_eq!(*container.resolve::<u32>("n").unwrap(), 100);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_unbind_reports_removal() {
        let container = Container::new();
        container.bind("x").to_value(1u8);

        assert!(container.unbind("x"));
        assert!(!container.unbind("x"));
        assert!(container.is_empty());
    }

    #[test]
    fn test_parent_dropped() {
        let child = {
            let root = Container::new();
            root.bind("x").to_value(1u8);
            root.create_child_container()
        };

        assert!(child.parent().is_none());
        assert!(matches!(
            child.resolve::<u8>("x"),
            Err(DiError::ParentDropped)
        ));
    }

    #[test]
    fn test_child_override_can_wrap_parent_binding() {
        let root = Container::new();
        root.bind("greeting").to_value(String::from("hello"));

        let child = root.create_child_container();
        child.bind("greeting").to_factory(|c| {
            let parent = c.parent().ok_or(DiError::ParentDropped)?;
            let inner = parent.resolve::<String>("greeting")?;
            Ok(format!("{inner} from child"))
        });

        assert_eq!(*child.resolve::<String>("greeting").unwrap(), "hello from child");
        assert_eq!(*root.resolve::<String>("greeting").unwrap(), "hello");
    }

    #[test]
    fn test_rebind_during_resolution_gets_fresh_request_instance() {
        let container = Container::new();
        container
            .bind("r")
            .to_factory(|_| Ok(1u32))
            .in_request_scope();
        container.bind("outer").to_factory(|c| {
            let before = *c.resolve::<u32>("r")?;
            c.rebind("r").to_factory(|_| Ok(2u32)).in_request_scope();
            let after = *c.resolve::<u32>("r")?;
            Ok((before, after))
        });

        assert_eq!(*container.resolve::<(u32, u32)>("outer").unwrap(), (1, 2));
    }

    #[test]
    fn test_auto_resolve_registered_injectable() {
        let container = Container::new();
        container
            .injectables()
            .register::<Repository>(InjectableOptions::default());
        container
            .injectables()
            .register::<UserService>(InjectableOptions::new().token("users"));

        let users = container.resolve::<UserService>("users").unwrap();
        let repo = container.get::<Repository>().unwrap();

        // Default lifetime for auto-registered types is singleton
        assert!(Arc::ptr_eq(&users.repo, &repo));
        assert!(container.is_bound_locally(Token::of::<Repository>()));
    }

    #[test]
    fn test_auto_resolve_disabled() {
        let container = Container::with_options(ContainerOptions::new().with_auto_resolve(false));
        container
            .injectables()
            .register::<Repository>(InjectableOptions::default());

        assert!(container.get::<Repository>().unwrap_err().is_unbound());
    }

    #[test]
    fn test_described_but_not_injectable_is_unbound() {
        let container = Container::new();
        container.injectables().describe::<Repository>();

        assert!(container.try_get::<Repository>().is_none());
    }

    #[test]
    fn test_auto_register_all() {
        let container = Container::with_options(
            ContainerOptions::new().with_default_lifetime(Lifetime::Transient),
        );
        container
            .injectables()
            .register::<Repository>(InjectableOptions::default());
        container
            .injectables()
            .register::<UserService>(InjectableOptions::new().lifetime(Lifetime::Singleton));
        container.bind(Token::of::<UserService>()).to_constructed::<UserService>();

        assert_eq!(container.auto_register_all(), 1);
        assert_eq!(container.auto_register_all(), 0);

        let bindings = container.bindings();
        assert_eq!(
            bindings[&Token::of::<Repository>()].lifetime(),
            Lifetime::Transient
        );
    }

    #[test]
    fn test_child_shares_injectables() {
        let root = Container::new();
        root.injectables()
            .register::<Repository>(InjectableOptions::default());

        let child = root.create_child_container();
        assert!(child.get::<Repository>().is_ok());
        // Auto-registration binds in the container that was asked
        assert!(child.is_bound_locally(Token::of::<Repository>()));
        assert!(!root.is_bound_locally(Token::of::<Repository>()));
    }

    #[test]
    fn test_concurrent_singleton_creates_once() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .bind("slow")
            .to_factory(|_| {
                CREATED.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(10));
                Ok(TestService {
                    value: "slow".into(),
                })
            })
            .in_singleton_scope();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.resolve::<TestService>("slow").unwrap())
            })
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_resolve_async_awaits_factory() {
        let container = Container::new();
        container
            .bind("db")
            .to_async_factory(|_| async {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                Ok(TestService {
                    value: "connected".into(),
                })
            })
            .in_singleton_scope();

        let a = container.resolve_async::<TestService>("db").await.unwrap();
        let b = container.resolve_async::<TestService>("db").await.unwrap();
        assert_eq!(a.value, "connected");
        assert!(Arc::ptr_eq(&a, &b));

        // Once cached, the synchronous path serves the same instance
        let cached = container.resolve::<TestService>("db").unwrap();
        assert!(Arc::ptr_eq(&a, &cached));
    }

    #[cfg(feature = "async")]
    #[test]
    fn test_sync_resolve_of_async_factory_fails() {
        let container = Container::new();
        container
            .bind("db")
            .to_async_factory(|_| async { Ok(1u32) })
            .in_transient_scope();

        assert!(matches!(
            container.resolve::<u32>("db"),
            Err(DiError::AsyncFactory { .. })
        ));
    }

    #[cfg(feature = "async")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_async_singleton_creates_once() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .bind("pool")
            .to_async_factory(|_| async {
                CREATED.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                Ok(7u64)
            })
            .in_singleton_scope();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                tokio::spawn(async move { container.resolve_async::<u64>("pool").await })
            })
            .collect();
        for task in tasks {
            assert_eq!(*task.await.unwrap().unwrap(), 7);
        }
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_resolve_async_constructed_and_parent_fallback() {
        let root = Container::new();
        root.bind(Token::of::<Repository>())
            .to_constructed::<Repository>()
            .in_singleton_scope();
        root.bind(Token::of::<UserService>())
            .to_constructed::<UserService>()
            .in_transient_scope();

        let child = root.create_child_container();
        let users = child
            .resolve_async::<UserService>(Token::of::<UserService>())
            .await
            .unwrap();
        let repo = root.get::<Repository>().unwrap();
        assert!(Arc::ptr_eq(&users.repo, &repo));
        assert!(child.resolve_async::<u8>("missing").await.unwrap_err().is_unbound());
    }
}
