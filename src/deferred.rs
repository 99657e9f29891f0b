//! Deferred references
//!
//! A deferred handle stands in for a dependency that must not be resolved
//! while its dependent is being built, typically one side of a cycle. It
//! records the owning container and the target token, resolves on first
//! access, and caches the result for as long as the handle (or any clone of
//! it) lives. Failures surface at first access, never at creation.
//!
//! Handles hold the container weakly: a handle that outlives every clone of
//! its container reports [`DiError::ContainerDropped`].

use crate::container::{Container, ContainerInner};
use crate::factory::Instance;
use crate::token::Token;
use crate::{DiError, Injectable, Result};
use once_cell::sync::OnceCell;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::trace;

struct DeferredInner {
    container: Weak<ContainerInner>,
    token: Token,
    resolved: OnceCell<Instance>,
}

/// Untyped deferred handle.
///
/// Clones share one cache. Two handles created separately for the same token
/// are independent and each resolves on its own, so a transient target may
/// yield different instances behind them.
#[derive(Clone)]
pub struct DeferredRef {
    inner: Arc<DeferredInner>,
}

impl DeferredRef {
    /// Create a handle resolving `token` through `container` on first use
    pub fn new(container: &Container, token: impl Into<Token>) -> Self {
        Self {
            inner: Arc::new(DeferredInner {
                container: container.downgrade(),
                token: token.into(),
                resolved: OnceCell::new(),
            }),
        }
    }

    /// The target token
    #[inline]
    pub fn token(&self) -> &Token {
        &self.inner.token
    }

    /// Whether the target has been resolved through this handle
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get().is_some()
    }

    /// Resolve the target, or return the cached instance
    pub fn force(&self) -> Result<Instance> {
        if let Some(instance) = self.inner.resolved.get() {
            return Ok(Arc::clone(instance));
        }

        let container = self
            .inner
            .container
            .upgrade()
            .map(Container::from_inner)
            .ok_or(DiError::ContainerDropped)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "bindery",
            token = %self.inner.token,
            "Deferred reference first access"
        );

        // Resolve outside the cell so a resolution that reaches this same
        // handle again fails on the cycle check instead of blocking on it.
        let instance = container.resolve_any(&self.inner.token)?;
        Ok(Arc::clone(self.inner.resolved.get_or_init(|| instance)))
    }

    /// Attach the expected target type
    pub fn typed<T: Injectable>(self) -> Deferred<T> {
        Deferred {
            handle: self,
            _marker: PhantomData,
        }
    }
}

impl std::fmt::Debug for DeferredRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRef")
            .field("token", &self.inner.token)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Typed deferred handle for `T`.
///
/// # Examples
///
/// ```rust
/// use bindery::{Container, Deferred};
///
/// let container = Container::new();
/// let greeting: Deferred<String> = Deferred::new(&container, "greeting");
///
/// // Bound after the handle was created: resolution happens on first use
/// container.bind("greeting").to_value(String::from("hello"));
///
/// assert!(!greeting.is_resolved());
/// assert_eq!(greeting.get().unwrap().as_str(), "hello");
/// assert!(greeting.is_resolved());
/// ```
///
/// A handle does not forward calls by itself. To let a consumer hold a
/// `Deferred<T>` wherever it expects a capability, implement that trait for
/// the handle and delegate through [`get`](Self::get):
///
/// ```rust
/// use bindery::{Container, Deferred, Result};
///
/// trait Mailer {
///     fn send(&self, to: &str) -> Result<String>;
/// }
///
/// struct SmtpMailer;
///
/// impl Mailer for SmtpMailer {
///     fn send(&self, to: &str) -> Result<String> {
///         Ok(format!("sent to {to}"))
///     }
/// }
///
/// impl Mailer for Deferred<SmtpMailer> {
///     fn send(&self, to: &str) -> Result<String> {
///         self.get()?.send(to)
///     }
/// }
///
/// let container = Container::new();
/// let mailer: Deferred<SmtpMailer> = Deferred::new(&container, "mailer");
/// container.bind("mailer").to_value(SmtpMailer);
///
/// assert_eq!(mailer.send("ops").unwrap(), "sent to ops");
/// ```
pub struct Deferred<T> {
    handle: DeferredRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Deferred<T> {
    /// Create a handle resolving `token` through `container` on first use
    pub fn new(container: &Container, token: impl Into<Token>) -> Self {
        DeferredRef::new(container, token).typed()
    }

    /// Resolve on first call, then return the cached instance
    pub fn get(&self) -> Result<Arc<T>> {
        self.handle
            .force()?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(self.handle.token()))
    }

    #[inline]
    pub fn token(&self) -> &Token {
        self.handle.token()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.handle.is_resolved()
    }

    /// The untyped handle
    #[inline]
    pub fn handle(&self) -> &DeferredRef {
        &self.handle
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("type", &std::any::type_name::<T>())
            .field("token", &self.handle.inner.token)
            .finish()
    }
}
