//! Error types for dependency resolution

use crate::binding::BindingKind;
use crate::token::Token;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while binding or resolving tokens
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// No binding exists for the token anywhere in the hierarchy
    #[error("No binding found for token: {token}")]
    Unbound { token: String },

    /// The token was re-entered while it was still being materialized
    #[error("Circular dependency detected while resolving {token}: {}", .path.join(" -> "))]
    CircularDependency { token: String, path: Vec<String> },

    /// A constructed binding references a type the descriptor provider does not know
    #[error("Type {type_name} is not constructible (no descriptor registered)")]
    NotConstructible { type_name: &'static str },

    /// The binding kind requires a payload that was never supplied
    #[error("{kind:?} binding for {token} has no payload")]
    MissingBindingPayload { token: String, kind: BindingKind },

    /// A constructor argument could not be resolved
    #[error("Error resolving dependency at position {position} ({token}) for {type_name}")]
    DependencyResolution {
        type_name: &'static str,
        position: usize,
        token: String,
        #[source]
        source: Box<DiError>,
    },

    /// A property injection could not be resolved or applied
    #[error("Error performing property injection for {property} in {type_name}")]
    PropertyInjection {
        type_name: &'static str,
        property: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// An asynchronous factory was reached from the synchronous resolve path
    #[error("Factory for {token} is asynchronous, use resolve_async instead")]
    AsyncFactory { token: String },

    /// The resolved instance is not of the requested type
    #[error("Instance bound to {token} is not a {expected}")]
    TypeMismatch {
        token: String,
        expected: &'static str,
    },

    /// A constructor asked for an argument in a shape it was not resolved in
    #[error("Invalid argument {position} for {type_name}: {reason}")]
    InvalidArgument {
        type_name: &'static str,
        position: usize,
        reason: &'static str,
    },

    /// Parent container was dropped while a child still delegates to it
    #[error("Parent container has been dropped")]
    ParentDropped,

    /// A deferred reference outlived the container that created it
    #[error("Owning container has been dropped")]
    ContainerDropped,

    /// Error raised by a caller-supplied factory or constructor
    #[error(transparent)]
    Factory(Arc<dyn std::error::Error + Send + Sync>),
}

impl DiError {
    /// Create an Unbound error for a token
    #[inline]
    pub fn unbound(token: &Token) -> Self {
        Self::Unbound {
            token: token.to_string(),
        }
    }

    /// Create a TypeMismatch error for a token and the requested type
    #[inline]
    pub fn type_mismatch<T: 'static>(token: &Token) -> Self {
        Self::TypeMismatch {
            token: token.to_string(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a MissingBindingPayload error
    #[inline]
    pub fn missing_payload(token: &Token, kind: BindingKind) -> Self {
        Self::MissingBindingPayload {
            token: token.to_string(),
            kind,
        }
    }

    /// Wrap a caller's own error so it can be returned from a factory.
    ///
    /// The wrapped error is surfaced unchanged by `resolve`.
    #[inline]
    pub fn factory<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(error))
    }

    /// Whether this error (or one it wraps) reports a circular dependency
    pub fn is_circular(&self) -> bool {
        match self {
            Self::CircularDependency { .. } => true,
            Self::DependencyResolution { source, .. } | Self::PropertyInjection { source, .. } => {
                source.is_circular()
            }
            _ => false,
        }
    }

    /// Whether this error (or one it wraps) reports an unbound token
    pub fn is_unbound(&self) -> bool {
        match self {
            Self::Unbound { .. } => true,
            Self::DependencyResolution { source, .. } | Self::PropertyInjection { source, .. } => {
                source.is_unbound()
            }
            _ => false,
        }
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
