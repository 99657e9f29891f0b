//! Factory types for producing instances
//!
//! Factories are stored type-erased: the typed closure handed to
//! `to_factory` is wrapped once at bind time so resolution only ever deals
//! with `Instance` values.

use crate::container::Container;
use crate::{Injectable, Result};
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "async")]
use std::future::Future;
#[cfg(feature = "async")]
use std::pin::Pin;

/// A type-erased resolved value
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Boxed future returned by asynchronous factories
#[cfg(feature = "async")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased synchronous factory function
type SyncFactoryFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Type-erased asynchronous factory function
#[cfg(feature = "async")]
type AsyncFactoryFn = Arc<dyn Fn(Container) -> BoxFuture<'static, Result<Instance>> + Send + Sync>;

/// Factory payload of a binding
#[derive(Clone)]
pub enum Factory {
    /// Produces the instance immediately
    Sync(SyncFactoryFn),
    /// Produces the instance through a future; only `resolve_async` can await it
    #[cfg(feature = "async")]
    Async(AsyncFactoryFn),
}

impl Factory {
    /// Wrap a typed synchronous factory
    pub fn new<T: Injectable, F>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        Factory::Sync(Arc::new(move |container: &Container| {
            factory(container).map(|value| Arc::new(value) as Instance)
        }))
    }

    /// Wrap a typed asynchronous factory
    #[cfg(feature = "async")]
    pub fn new_async<T: Injectable, F, Fut>(factory: F) -> Self
    where
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Factory::Async(Arc::new(move |container: Container| {
            let fut = factory(container);
            Box::pin(async move { fut.await.map(|value| Arc::new(value) as Instance) })
                as BoxFuture<'static, Result<Instance>>
        }))
    }

    /// Check if this factory has to be awaited
    #[inline]
    pub fn is_async(&self) -> bool {
        match self {
            Factory::Sync(_) => false,
            #[cfg(feature = "async")]
            Factory::Async(_) => true,
        }
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_async() {
            "Factory::Async"
        } else {
            "Factory::Sync"
        })
    }
}
