//! Instance construction for constructed bindings

use crate::container::Container;
use crate::deferred::DeferredRef;
use crate::factory::Instance;
use crate::provider::{Argument, Arguments, DescriptorProvider, PropertyInjection};
use crate::token::TypeKey;
use crate::{DiError, Result};

#[cfg(feature = "logging")]
use tracing::trace;

/// A freshly built instance plus the properties still to inject into it
pub(crate) struct Produced {
    pub(crate) instance: Instance,
    pub(crate) properties: Vec<PropertyInjection>,
}

impl Produced {
    /// An instance with nothing left to inject
    pub(crate) fn bare(instance: Instance) -> Self {
        Self {
            instance,
            properties: Vec::new(),
        }
    }
}

/// Build `ty` with arguments resolved through `owner`.
///
/// Arguments are resolved in declaration order, depth-first, before the
/// constructor runs.
pub(crate) fn construct(owner: &Container, ty: &TypeKey) -> Result<Produced> {
    construct_with(owner, owner.provider(), ty)
}

pub(crate) fn construct_with(
    owner: &Container,
    provider: &dyn DescriptorProvider,
    ty: &TypeKey,
) -> Result<Produced> {
    let not_constructible = || DiError::NotConstructible {
        type_name: ty.name(),
    };
    if !provider.is_constructible(ty) {
        return Err(not_constructible());
    }
    let constructor = provider.constructor(ty).ok_or_else(not_constructible)?;

    let tokens = provider.dependency_tokens(ty);
    let optional = provider.optional_positions(ty);
    let deferred = provider.deferred_positions(ty);
    let mut named = provider.named_positions(ty);

    let mut values = Vec::with_capacity(tokens.len());
    for (position, token) in tokens.into_iter().enumerate() {
        let token = match named.remove(&position) {
            Some(name) => token.named(name),
            None => token,
        };

        if deferred.contains(&position) {
            values.push(Argument::Deferred(DeferredRef::new(owner, token)));
            continue;
        }

        match owner.resolve_any(&token) {
            Ok(instance) => values.push(Argument::Value(instance)),
            Err(_err) if optional.contains(&position) => {
                #[cfg(feature = "logging")]
                trace!(
                    target: "bindery",
                    type_name = ty.name(),
                    position,
                    token = %token,
                    error = %_err,
                    "Optional dependency unresolved"
                );
                values.push(Argument::Absent);
            }
            Err(source) => {
                return Err(DiError::DependencyResolution {
                    type_name: ty.name(),
                    position,
                    token: token.to_string(),
                    source: Box::new(source),
                });
            }
        }
    }

    let instance = constructor(&Arguments::new(ty.name(), values))?;
    Ok(Produced {
        instance,
        properties: provider.property_injections(ty),
    })
}

/// Resolve and apply setter-style injections to an already published instance
pub(crate) fn inject_properties(
    owner: &Container,
    type_name: &'static str,
    instance: &Instance,
    properties: Vec<PropertyInjection>,
) -> Result<()> {
    for property in properties {
        let wrap = |source: DiError| DiError::PropertyInjection {
            type_name,
            property: property.key(),
            source: Box::new(source),
        };
        let value = owner.resolve_any(property.token()).map_err(wrap)?;
        property.apply(instance, value).map_err(wrap)?;
    }
    Ok(())
}
