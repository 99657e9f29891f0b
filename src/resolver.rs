//! Resolution engine
//!
//! The synchronous path runs every binding it reaches through the cycle guard
//! of the active resolution tree. The asynchronous path performs the same
//! hierarchical lookup but does not guard its own top-level token: it is meant
//! for leaf and factory resolution. Constructed types reached from it are
//! still built through the synchronous path and guarded there, so only a
//! cycle that runs through an async factory goes undetected.

use crate::binding::{Binding, BindingKind};
use crate::construct::{self, Produced};
use crate::container::Container;
use crate::factory::{Factory, Instance};
use crate::provider::PropertyInjection;
use crate::scope::{self, Lifetime, ResolutionGuard};
use crate::token::Token;
use crate::{DiError, Result};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// Find the closest binding for `token`, walking up the parent chain.
///
/// Returns the container that owns the binding along with it; factories and
/// constructed dependencies are resolved through that owner.
pub(crate) fn find_binding(
    container: &Container,
    token: &Token,
) -> Result<(Container, Arc<Binding>)> {
    let mut current = container.clone();
    loop {
        if let Some(binding) = current.inner().bindings.get(token) {
            return Ok((current, binding));
        }

        let Some(parent) = current.inner().parent.as_ref() else {
            return Err(DiError::unbound(token));
        };
        let parent = parent.upgrade().ok_or(DiError::ParentDropped)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "bindery",
            token = %token,
            depth = current.depth(),
            "Token not bound locally, checking parent"
        );

        current = Container::from_inner(parent);
    }
}

/// Synchronous resolution
pub(crate) fn resolve(container: &Container, token: &Token) -> Result<Instance> {
    let (owner, binding) = find_binding(container, token)?;
    scope::check_cycle(binding.id(), token)?;

    if binding.lifetime() == Lifetime::Singleton {
        if let Some(instance) = binding.cache().get() {
            #[cfg(feature = "logging")]
            trace!(target: "bindery", token = %token, "Singleton cache hit");

            return Ok(Arc::clone(instance));
        }
    }

    let mut guard = ResolutionGuard::enter(binding.id(), token.clone());

    match binding.lifetime() {
        Lifetime::Singleton => {
            let mut pending = Vec::new();
            let instance = binding
                .cache()
                .get_or_try_init(|| {
                    let produced = materialize(&owner, &binding)?;
                    pending = produced.properties;
                    Ok::<_, DiError>(produced.instance)
                })
                .map(Arc::clone)?;

            // Published: the token can leave the stack so setters may cycle back
            guard.release_token();
            inject(&owner, &binding, &instance, pending)?;
            Ok(instance)
        }
        Lifetime::Request => {
            if let Some(instance) = guard.request_cached(binding.id()) {
                #[cfg(feature = "logging")]
                trace!(target: "bindery", token = %token, "Request cache hit");

                return Ok(instance);
            }

            let produced = materialize(&owner, &binding)?;
            guard.cache_request(binding.id(), Arc::clone(&produced.instance));
            guard.release_token();
            inject(&owner, &binding, &produced.instance, produced.properties)?;
            Ok(produced.instance)
        }
        Lifetime::Transient => {
            let produced = materialize(&owner, &binding)?;
            inject(&owner, &binding, &produced.instance, produced.properties)?;
            Ok(produced.instance)
        }
    }
}

/// Produce a new instance per binding kind
fn materialize(owner: &Container, binding: &Binding) -> Result<Produced> {
    let missing = || DiError::missing_payload(binding.token(), binding.kind());

    match binding.kind() {
        BindingKind::Value => binding
            .value()
            .map(|value| Produced::bare(Arc::clone(value)))
            .ok_or_else(missing),
        BindingKind::Factory => match binding.factory() {
            Some(Factory::Sync(create)) => create(owner).map(Produced::bare),
            #[cfg(feature = "async")]
            Some(Factory::Async(_)) => Err(DiError::AsyncFactory {
                token: binding.token().to_string(),
            }),
            None => Err(missing()),
        },
        BindingKind::Constructed => {
            let ty = binding.implementation().ok_or_else(missing)?;
            construct::construct(owner, &ty)
        }
    }
}

fn inject(
    owner: &Container,
    binding: &Binding,
    instance: &Instance,
    properties: Vec<PropertyInjection>,
) -> Result<()> {
    if properties.is_empty() {
        return Ok(());
    }
    let type_name = binding
        .implementation()
        .map(|ty| ty.name())
        .unwrap_or("<unknown>");
    construct::inject_properties(owner, type_name, instance, properties)
}

/// Asynchronous resolution
#[cfg(feature = "async")]
pub(crate) async fn resolve_async(container: &Container, token: &Token) -> Result<Instance> {
    let (owner, binding) = find_binding(container, token)?;

    match binding.lifetime() {
        Lifetime::Singleton => {
            if let Some(instance) = binding.cached_instance() {
                #[cfg(feature = "logging")]
                trace!(target: "bindery", token = %token, "Singleton cache hit");

                return Ok(instance);
            }

            // Single-flight: concurrent first resolutions wait for the winner
            let _init = binding.init_lock().lock().await;
            if let Some(instance) = binding.cached_instance() {
                return Ok(instance);
            }

            let produced = materialize_async(&owner, &binding).await?;
            let instance = binding.publish(Arc::clone(&produced.instance));
            if Arc::ptr_eq(&instance, &produced.instance) {
                inject_in_tree(&owner, &binding, &instance, produced.properties)?;
            }
            Ok(instance)
        }
        Lifetime::Request | Lifetime::Transient => {
            let produced = materialize_async(&owner, &binding).await?;
            inject_in_tree(&owner, &binding, &produced.instance, produced.properties)?;
            Ok(produced.instance)
        }
    }
}

#[cfg(feature = "async")]
async fn materialize_async(owner: &Container, binding: &Binding) -> Result<Produced> {
    if binding.kind() == BindingKind::Factory {
        if let Some(Factory::Async(create)) = binding.factory() {
            return create(owner.clone()).await.map(Produced::bare);
        }
    }

    // Everything else is synchronous and joins one resolution tree
    let _tree = ResolutionGuard::tree();
    materialize(owner, binding)
}

#[cfg(feature = "async")]
fn inject_in_tree(
    owner: &Container,
    binding: &Binding,
    instance: &Instance,
    properties: Vec<PropertyInjection>,
) -> Result<()> {
    if properties.is_empty() {
        return Ok(());
    }
    let _tree = ResolutionGuard::tree();
    inject(owner, binding, instance, properties)
}
