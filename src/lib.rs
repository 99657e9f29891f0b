//! # Bindery - Hierarchical Dependency Resolution for Rust
//!
//! A dependency-resolution runtime: bind tokens to values, factories or
//! constructed types, then resolve object graphs on demand with lifecycle
//! scoping, cycle detection and parent/child overriding.
//!
//! ## Features
//!
//! - 🔑 **Tokens** - Strings, symbols, Rust types, identity handles and named variants
//! - ♻️ **Lifetimes** - Singleton, transient and per-resolution-tree (request) scoping
//! - 🌳 **Hierarchy** - Child containers override parents without mutating them
//! - 🔁 **Cycle detection** - Re-entrant tokens fail fast with the full path
//! - 💤 **Deferred references** - Break cycles by resolving a dependency on first use
//! - ⏳ **Async factories** - Await factories with single-flight singleton initialization
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use bindery::{Container, InjectionToken};
//!
//! struct Config {
//!     api_url: String,
//!     timeout_ms: u64,
//! }
//!
//! struct ConsoleLogger;
//!
//! let logger = InjectionToken::new("Logger");
//! let container = Container::new();
//!
//! container.bind("Config").to_value(Config {
//!     api_url: "https://x".into(),
//!     timeout_ms: 5000,
//! });
//! container
//!     .bind(&logger)
//!     .to_factory(|_| Ok(ConsoleLogger))
//!     .in_singleton_scope();
//!
//! let config = container.resolve::<Config>("Config").unwrap();
//! assert_eq!(config.timeout_ms, 5000);
//!
//! let a = container.resolve::<ConsoleLogger>(&logger).unwrap();
//! let b = container.resolve::<ConsoleLogger>(&logger).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Constructed Types and Cycles
//!
//! ```rust
//! use bindery::{Constructible, Container, Deferred, ParamSpec, Token, TypeDescriptor};
//! use std::sync::Arc;
//!
//! struct A {
//!     b: Deferred<B>,
//! }
//!
//! struct B {
//!     a: Arc<A>,
//! }
//!
//! impl Constructible for A {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<A>()
//!             .param(ParamSpec::of::<B>().deferred())
//!             .build(|args| Ok(A { b: args.deferred(0)? }))
//!     }
//! }
//!
//! impl Constructible for B {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<B>()
//!             .param(ParamSpec::of::<A>())
//!             .build(|args| Ok(B { a: args.get(0)? }))
//!     }
//! }
//!
//! let container = Container::new();
//! container.bind(Token::of::<A>()).to_constructed::<A>().in_singleton_scope();
//! container.bind(Token::of::<B>()).to_constructed::<B>().in_singleton_scope();
//!
//! let b = container.get::<B>().unwrap();
//! let b_again = b.a.b.get().unwrap();
//! assert!(Arc::ptr_eq(&b, &b_again));
//! ```

// Lets `#[derive(Constructible)]` output name `::bindery` inside this crate too
extern crate self as bindery;

mod binding;
mod builder;
mod construct;
mod container;
mod deferred;
mod error;
mod factory;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod registry;
mod resolver;
mod scope;
mod storage;
mod token;

pub use binding::*;
pub use builder::*;
pub use container::*;
pub use deferred::*;
pub use error::*;
pub use factory::*;
pub use provider::*;
pub use registry::*;
pub use scope::{Lifetime, ResolutionId, current_resolution};
pub use storage::BindingRegistry;
pub use token::*;

#[cfg(feature = "derive")]
pub use bindery_derive::Constructible;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Constructible, Container, ContainerOptions, Deferred, DiError, InjectableOptions,
        InjectionToken, Lifetime, ParamSpec, Property, Result, Token, TypeDescriptor,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    struct Config {
        api_url: String,
        timeout: u64,
    }

    struct ConsoleLogger {
        id: u32,
    }

    #[test]
    fn test_config_value_by_identity() {
        let container = Container::new();
        let config = Arc::new(Config {
            api_url: "https://x".into(),
            timeout: 5000,
        });
        container.bind("Config").to_arc(Arc::clone(&config));

        let resolved = container.resolve::<Config>("Config").unwrap();
        assert!(Arc::ptr_eq(&resolved, &config));
        assert_eq!(resolved.timeout, 5000);
    }

    #[test]
    fn test_singleton_logger_factory() {
        static CREATED: AtomicU32 = AtomicU32::new(0);
        const LOGGER: Token = Token::symbol("LOGGER");

        let container = Container::new();
        container
            .bind(LOGGER)
            .to_factory(|_| {
                Ok(ConsoleLogger {
                    id: CREATED.fetch_add(1, Ordering::SeqCst),
                })
            })
            .in_singleton_scope();

        let a = container.resolve::<ConsoleLogger>(LOGGER).unwrap();
        let b = container.resolve::<ConsoleLogger>(LOGGER).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id, 0);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_factory_creates_new_instances() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .bind("logger")
            .to_factory(|_| {
                Ok(ConsoleLogger {
                    id: CREATED.fetch_add(1, Ordering::SeqCst),
                })
            })
            .in_transient_scope();

        let a = container.resolve::<ConsoleLogger>("logger").unwrap();
        let b = container.resolve::<ConsoleLogger>("logger").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_child_override_and_unbind_fallthrough() {
        let parent = Container::new();
        parent.bind("Config").to_value(Config {
            api_url: "https://prod".into(),
            timeout: 5000,
        });

        let child = parent.create_child_container();
        assert_eq!(
            child.resolve::<Config>("Config").unwrap().api_url,
            "https://prod"
        );

        child.bind("Config").to_value(Config {
            api_url: "https://test".into(),
            timeout: 10,
        });
        assert_eq!(
            child.resolve::<Config>("Config").unwrap().api_url,
            "https://test"
        );

        child.unbind("Config");
        assert_eq!(
            child.resolve::<Config>("Config").unwrap().api_url,
            "https://prod"
        );
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn test_try_resolve_unbound_is_none() {
        let container = Container::new();
        assert!(container.try_resolve::<Config>("missing").is_none());
        assert!(container.try_get::<Config>().is_none());
    }

    #[derive(Debug)]
    struct Boom(&'static str);

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom: {}", self.0)
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_factory_error_surfaces_unmodified() {
        let container = Container::new();
        container
            .bind("flaky")
            .to_factory::<Config, _>(|_| Err(DiError::factory(Boom("disk full"))))
            .in_singleton_scope();

        let err = container.resolve::<Config>("flaky").err().unwrap();
        assert_eq!(err.to_string(), "boom: disk full");
        match err {
            DiError::Factory(inner) => assert!(inner.downcast_ref::<Boom>().is_some()),
            other => panic!("unexpected error: {other:?}"),
        }

        // A failed singleton is not cached
        assert!(container.bindings()[&Token::from("flaky")]
            .cached_instance()
            .is_none());
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_factory_error_surfaces_unmodified() {
        let container = Container::new();
        container
            .bind("flaky")
            .to_async_factory::<Config, _, _>(|_| async {
                Err(DiError::factory(Boom("socket closed")))
            })
            .in_singleton_scope();

        let err = container
            .resolve_async::<Config>("flaky")
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "boom: socket closed");
        match err {
            DiError::Factory(inner) => assert!(inner.downcast_ref::<Boom>().is_some()),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(container.bindings()[&Token::from("flaky")]
            .cached_instance()
            .is_none());
    }

    #[test]
    fn test_missing_payload_fails_at_resolve_time() {
        let container = Container::new();
        container.register_binding(Binding::new("half", BindingKind::Factory));
        container.register_binding(Binding::new("ctor", BindingKind::Constructed));

        assert!(matches!(
            container.resolve::<u8>("half"),
            Err(DiError::MissingBindingPayload {
                kind: BindingKind::Factory,
                ..
            })
        ));
        assert!(matches!(
            container.resolve::<u8>("ctor"),
            Err(DiError::MissingBindingPayload {
                kind: BindingKind::Constructed,
                ..
            })
        ));
    }

    #[test]
    fn test_not_constructible_type() {
        struct Unknown;

        let container = Container::new();
        container
            .bind("unknown")
            .to_type(TypeKey::of::<Unknown>())
            .in_singleton_scope();

        assert!(matches!(
            container.resolve::<Unknown>("unknown").err(),
            Some(DiError::NotConstructible { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Cycles
    // -------------------------------------------------------------------------

    struct ServiceA {
        b: Arc<ServiceB>,
    }

    struct ServiceB {
        a: Deferred<ServiceA>,
    }

    impl ServiceA {
        fn name(&self) -> &'static str {
            "A"
        }
    }

    impl ServiceB {
        fn greet_a(&self) -> Result<&'static str> {
            Ok(self.a.get()?.name())
        }
    }

    fn bind_pair(container: &Container, deferred: bool) {
        let a = TypeDescriptor::builder::<ServiceA>()
            .param(ParamSpec::of::<ServiceB>())
            .build(|args| Ok(ServiceA { b: args.get(0)? }));

        let mut b_param = ParamSpec::of::<ServiceA>();
        if deferred {
            b_param = b_param.deferred();
        }
        let b = TypeDescriptor::builder::<ServiceB>()
            .param(b_param)
            .build(move |args| {
                if deferred {
                    Ok(ServiceB {
                        a: args.deferred(0)?,
                    })
                } else {
                    // Resolving eagerly fails before this point
                    let _eager: Arc<ServiceA> = args.get(0)?;
                    Err(DiError::ContainerDropped)
                }
            });

        let a = container.injectables().add_descriptor(a);
        let b = container.injectables().add_descriptor(b);
        container
            .bind(Token::of::<ServiceA>())
            .to_type(a)
            .in_singleton_scope();
        container
            .bind(Token::of::<ServiceB>())
            .to_type(b)
            .in_singleton_scope();
    }

    #[test]
    fn test_cycle_without_deferred_fails() {
        let container = Container::new();
        bind_pair(&container, false);

        let err = container.get::<ServiceA>().err().unwrap();
        assert!(err.is_circular());
        assert!(container.get::<ServiceB>().err().unwrap().is_circular());

        // The stack was unwound: unrelated resolutions still work
        container.bind("ok").to_value(1u8);
        assert_eq!(*container.resolve::<u8>("ok").unwrap(), 1);
    }

    #[test]
    fn test_cycle_with_deferred_succeeds() {
        let container = Container::new();
        bind_pair(&container, true);

        let b = container.get::<ServiceB>().unwrap();
        assert!(!b.a.is_resolved());
        assert_eq!(b.greet_a().unwrap(), "A");

        // The deferred A was built with this very B
        let a = container.get::<ServiceA>().unwrap();
        assert!(Arc::ptr_eq(&a.b, &b));
        assert!(Arc::ptr_eq(&b.a.get().unwrap(), &a));
    }

    #[test]
    fn test_self_dependency_is_circular() {
        struct Selfish;

        let container = Container::new();
        container
            .bind("selfish")
            .to_factory(|c| {
                c.resolve::<Selfish>("selfish")?;
                Ok(Selfish)
            })
            .in_transient_scope();

        match container.resolve::<Selfish>("selfish").err().unwrap() {
            DiError::CircularDependency { path, .. } => {
                assert_eq!(path, vec!["selfish", "selfish"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Property injection
    // -------------------------------------------------------------------------

    struct Parent {
        child: Arc<Child>,
    }

    struct Child {
        parent: Property<Parent>,
    }

    fn bind_setter_pair(container: &Container, child_lifetime: Lifetime) {
        let parent = TypeDescriptor::builder::<Parent>()
            .param(ParamSpec::of::<Child>())
            .build(|args| Ok(Parent { child: args.get(0)? }));
        let child = TypeDescriptor::builder::<Child>()
            .property::<Parent, _>("parent", Token::of::<Parent>(), |child: &Child, parent| {
                child.parent.set(parent);
            })
            .build(|_| {
                Ok(Child {
                    parent: Property::new(),
                })
            });

        let parent = container.injectables().add_descriptor(parent);
        let child = container.injectables().add_descriptor(child);
        container
            .bind(Token::of::<Parent>())
            .to_type(parent)
            .in_singleton_scope();
        container
            .bind(Token::of::<Child>())
            .to_type(child)
            .in_lifetime(child_lifetime);
    }

    #[test]
    fn test_setter_injection_closes_singleton_cycle() {
        let container = Container::new();
        bind_setter_pair(&container, Lifetime::Singleton);

        let child = container.get::<Child>().unwrap();
        let parent = child.parent.get().unwrap();
        assert!(Arc::ptr_eq(&parent.child, &child));
    }

    #[test]
    fn test_setter_cycle_through_transient_is_circular() {
        let container = Container::new();
        bind_setter_pair(&container, Lifetime::Transient);

        let err = container.get::<Child>().err().unwrap();
        assert!(matches!(err, DiError::PropertyInjection { property: "parent", .. }));
        assert!(err.is_circular());
    }

    // -------------------------------------------------------------------------
    // Request scope
    // -------------------------------------------------------------------------

    struct RequestId(u32);

    struct Handler {
        first: Arc<RequestId>,
        second: Arc<RequestId>,
    }

    #[test]
    fn test_request_scope_shared_within_one_tree() {
        static NEXT: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .bind(Token::of::<RequestId>())
            .to_factory(|_| Ok(RequestId(NEXT.fetch_add(1, Ordering::SeqCst))))
            .in_request_scope();
        let handler = container.injectables().add_descriptor(
            TypeDescriptor::builder::<Handler>()
                .param(ParamSpec::of::<RequestId>())
                .param(ParamSpec::of::<RequestId>())
                .build(|args| {
                    Ok(Handler {
                        first: args.get(0)?,
                        second: args.get(1)?,
                    })
                }),
        );
        container
            .bind(Token::of::<Handler>())
            .to_type(handler)
            .in_transient_scope();

        let one = container.get::<Handler>().unwrap();
        let two = container.get::<Handler>().unwrap();

        assert!(Arc::ptr_eq(&one.first, &one.second));
        assert!(!Arc::ptr_eq(&one.first, &two.first));
        assert_ne!(one.first.0, two.first.0);
    }

    #[test]
    fn test_named_and_optional_dependencies() {
        struct Db(&'static str);
        struct Repo {
            primary: Arc<Db>,
            replica: Option<Arc<Db>>,
            cache: Option<Arc<String>>,
        }

        let container = Container::new();
        container
            .bind(Token::of::<Db>().named("primary"))
            .to_value(Db("primary"));
        container
            .bind(Token::of::<Db>().named("replica"))
            .to_value(Db("replica"));
        let repo = container.injectables().add_descriptor(
            TypeDescriptor::builder::<Repo>()
                .param(ParamSpec::of::<Db>().named("primary"))
                .param(ParamSpec::of::<Db>().named("replica").optional())
                .param(ParamSpec::new("cache").optional())
                .build(|args| {
                    Ok(Repo {
                        primary: args.get(0)?,
                        replica: args.optional(1)?,
                        cache: args.optional(2)?,
                    })
                }),
        );
        container.bind("repo").to_type(repo).in_singleton_scope();

        let repo = container.resolve::<Repo>("repo").unwrap();
        assert_eq!(repo.primary.0, "primary");
        assert_eq!(repo.replica.as_ref().unwrap().0, "replica");
        assert!(repo.cache.is_none());
    }

    #[test]
    fn test_dependency_failure_is_wrapped() {
        struct Needy {
            _db: Arc<String>,
        }

        let container = Container::new();
        let needy = container.injectables().add_descriptor(
            TypeDescriptor::builder::<Needy>()
                .param(ParamSpec::new("db"))
                .build(|args| Ok(Needy { _db: args.get(0)? })),
        );
        container.bind("needy").to_type(needy).in_singleton_scope();

        match container.resolve::<Needy>("needy").err().unwrap() {
            DiError::DependencyResolution {
                type_name,
                position,
                token,
                source,
            } => {
                assert!(type_name.ends_with("Needy"));
                assert_eq!(position, 0);
                assert_eq!(token, "db");
                assert!(matches!(*source, DiError::Unbound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolution_tree_closed_after_resolve() {
        let container = Container::new();
        container
            .bind("inside")
            .to_factory(|_| Ok(current_resolution().is_some()))
            .in_transient_scope();

        assert!(*container.resolve::<bool>("inside").unwrap());
        assert!(current_resolution().is_none());
    }
}
