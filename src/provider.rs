//! Descriptor traits for constructible types
//!
//! A constructed binding needs to know, for its implementation type, which
//! tokens feed which constructor positions, which positions are optional or
//! deferred, and which properties are injected after construction. That
//! metadata comes from a [`DescriptorProvider`]; [`TypeDescriptor`] is the
//! explicit, builder-made form of it and [`Constructible`] the trait (usually
//! derived) that produces one.

use crate::deferred::{Deferred, DeferredRef};
use crate::factory::Instance;
use crate::token::{Token, TypeKey};
use crate::{DiError, Result};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

/// Marker trait for types that can be bound and resolved.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
///
/// # Examples
///
/// ```rust
/// use bindery::Container;
///
/// // Any type that is Send + Sync + 'static works automatically
/// struct MyService {
///     name: String,
/// }
///
/// let container = Container::new();
/// container.bind("service").to_value(MyService { name: "svc".into() });
/// ```
pub trait Injectable: Send + Sync + 'static {}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type-erased constructor: builds an instance from resolved arguments
pub type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

type PropertySetter = Arc<dyn Fn(&Instance, Instance) -> Result<()> + Send + Sync>;

/// Source of per-type dependency metadata.
///
/// Positions are zero-based constructor argument indices. Implementations
/// must answer consistently for the lifetime of the container using them.
pub trait DescriptorProvider: Send + Sync {
    /// Whether `ty` carries a descriptor at all
    fn is_constructible(&self, ty: &TypeKey) -> bool;

    /// Constructor dependency tokens in declaration order
    fn dependency_tokens(&self, ty: &TypeKey) -> Vec<Token>;

    /// Positions whose resolution failure yields "no value"
    fn optional_positions(&self, ty: &TypeKey) -> HashSet<usize>;

    /// Positions resolved through a deferred handle
    fn deferred_positions(&self, ty: &TypeKey) -> HashSet<usize>;

    /// Positions that resolve a named variant of their token
    fn named_positions(&self, ty: &TypeKey) -> HashMap<usize, Arc<str>>;

    /// Properties populated after construction
    fn property_injections(&self, ty: &TypeKey) -> Vec<PropertyInjection>;

    /// The constructor for `ty`
    fn constructor(&self, ty: &TypeKey) -> Option<Constructor>;
}

/// Declaration of one constructor parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    token: Token,
    optional: bool,
    deferred: bool,
    name: Option<Arc<str>>,
}

impl ParamSpec {
    /// A required parameter resolved from `token`
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            optional: false,
            deferred: false,
            name: None,
        }
    }

    /// A required parameter resolved from the type token of `T`
    pub fn of<T: 'static>() -> Self {
        Self::new(Token::of::<T>())
    }

    /// Substitute "no value" when resolution fails
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Pass a deferred handle instead of resolving now
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Resolve the named variant of the token
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The declared token, before any name is applied
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    #[inline]
    pub fn name(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }
}

/// A property populated after construction
#[derive(Clone)]
pub struct PropertyInjection {
    key: &'static str,
    token: Token,
    apply: PropertySetter,
}

impl PropertyInjection {
    /// Property name, for diagnostics
    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Token the property value is resolved from
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Hand `value` to the target instance
    pub(crate) fn apply(&self, target: &Instance, value: Instance) -> Result<()> {
        (self.apply)(target, value)
    }
}

impl std::fmt::Debug for PropertyInjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyInjection")
            .field("key", &self.key)
            .field("token", &self.token)
            .finish()
    }
}

/// Explicit dependency metadata for one type.
///
/// # Examples
///
/// ```rust
/// use bindery::{Container, ParamSpec, Token, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler {
///     clock: Arc<Clock>,
///     label: Option<Arc<String>>,
/// }
///
/// let container = Container::new();
/// container.bind(Token::of::<Clock>()).to_value(Clock);
///
/// let key = container.injectables().add_descriptor(
///     TypeDescriptor::builder::<Scheduler>()
///         .param(ParamSpec::of::<Clock>())
///         .param(ParamSpec::new("label").optional())
///         .build(|args| {
///             Ok(Scheduler {
///                 clock: args.get(0)?,
///                 label: args.optional(1)?,
///             })
///         }),
/// );
/// container.bind("scheduler").to_type(key).in_singleton_scope();
///
/// let scheduler = container.resolve::<Scheduler>("scheduler").unwrap();
/// assert!(scheduler.label.is_none());
/// ```
pub struct TypeDescriptor {
    type_key: TypeKey,
    params: Vec<ParamSpec>,
    properties: Vec<PropertyInjection>,
    constructor: Constructor,
}

impl TypeDescriptor {
    /// Start describing `T`
    pub fn builder<T: Injectable>() -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            params: Vec::new(),
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    #[inline]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyInjection] {
        &self.properties
    }

    #[inline]
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.type_key)
            .field("params", &self.params)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Builder for [`TypeDescriptor`]
#[must_use = "call build() to finish the descriptor"]
pub struct TypeDescriptorBuilder<T> {
    params: Vec<ParamSpec>,
    properties: Vec<PropertyInjection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> TypeDescriptorBuilder<T> {
    /// Append the next constructor parameter
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Declare a property resolved from `token` after construction.
    ///
    /// `setter` receives the freshly built instance and the resolved value;
    /// pair it with a [`Property`] field for set-once semantics.
    pub fn property<D, F>(mut self, key: &'static str, token: impl Into<Token>, setter: F) -> Self
    where
        D: Injectable,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        let token = token.into();
        let value_token = token.clone();
        let apply: PropertySetter = Arc::new(move |target: &Instance, value: Instance| {
            let target = (**target)
                .downcast_ref::<T>()
                .ok_or_else(|| DiError::type_mismatch::<T>(&Token::of::<T>()))?;
            let value = value
                .downcast::<D>()
                .map_err(|_| DiError::type_mismatch::<D>(&value_token))?;
            setter(target, value);
            Ok(())
        });
        self.properties.push(PropertyInjection { key, token, apply });
        self
    }

    /// Finish with the constructor
    pub fn build<F>(self, constructor: F) -> TypeDescriptor
    where
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        TypeDescriptor {
            type_key: TypeKey::of::<T>(),
            params: self.params,
            properties: self.properties,
            constructor: Arc::new(move |args: &Arguments| {
                constructor(args).map(|value| Arc::new(value) as Instance)
            }),
        }
    }
}

/// Types that describe their own construction.
///
/// Usually derived with `#[derive(Constructible)]` (feature `derive`).
pub trait Constructible: Injectable + Sized {
    /// Dependency metadata for `Self`
    fn descriptor() -> TypeDescriptor;
}

/// Set-once slot for a property-injected dependency.
///
/// The container fills it after the owner is constructed. Until then, and
/// forever if the owning binding was never resolved through a container,
/// [`get`](Self::get) returns `None`.
pub struct Property<T> {
    slot: OnceCell<Arc<T>>,
}

impl<T> Property<T> {
    /// An empty slot
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Fill the slot; returns `false` if it was already filled
    pub fn set(&self, value: Arc<T>) -> bool {
        self.slot.set(value).is_ok()
    }

    /// The injected value, if any
    #[inline]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("set", &self.is_set())
            .finish()
    }
}

/// One resolved constructor argument
#[derive(Clone)]
pub enum Argument {
    /// The resolved instance
    Value(Instance),
    /// An optional dependency that could not be resolved
    Absent,
    /// A handle resolving on first use
    Deferred(DeferredRef),
}

impl std::fmt::Debug for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Argument::Value(_) => f.write_str("Value"),
            Argument::Absent => f.write_str("Absent"),
            Argument::Deferred(handle) => write!(f, "Deferred({})", handle.token()),
        }
    }
}

/// Resolved constructor arguments, in declaration order
#[derive(Debug)]
pub struct Arguments {
    type_name: &'static str,
    values: Vec<Argument>,
}

impl Arguments {
    pub(crate) fn new(type_name: &'static str, values: Vec<Argument>) -> Self {
        Self { type_name, values }
    }

    /// Required argument at `position`
    pub fn get<T: Injectable>(&self, position: usize) -> Result<Arc<T>> {
        match self.at(position)? {
            Argument::Value(instance) => self.downcast(position, instance),
            Argument::Absent => Err(self.invalid(position, "argument is optional and unresolved")),
            Argument::Deferred(_) => Err(self.invalid(position, "argument is deferred")),
        }
    }

    /// Optional argument at `position`; `None` when it could not be resolved
    pub fn optional<T: Injectable>(&self, position: usize) -> Result<Option<Arc<T>>> {
        match self.at(position)? {
            Argument::Value(instance) => self.downcast(position, instance).map(Some),
            Argument::Absent => Ok(None),
            Argument::Deferred(_) => Err(self.invalid(position, "argument is deferred")),
        }
    }

    /// Deferred handle at `position`
    pub fn deferred<T: Injectable>(&self, position: usize) -> Result<Deferred<T>> {
        match self.at(position)? {
            Argument::Deferred(handle) => Ok(handle.clone().typed()),
            _ => Err(self.invalid(position, "argument is not deferred")),
        }
    }

    /// Raw argument at `position`
    pub fn raw(&self, position: usize) -> Option<&Argument> {
        self.values.get(position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn at(&self, position: usize) -> Result<&Argument> {
        self.values
            .get(position)
            .ok_or_else(|| self.invalid(position, "no argument declared at this position"))
    }

    fn downcast<T: Injectable>(&self, position: usize, instance: &Instance) -> Result<Arc<T>> {
        Arc::clone(instance)
            .downcast::<T>()
            .map_err(|_| self.invalid(position, "argument has a different type"))
    }

    fn invalid(&self, position: usize, reason: &'static str) -> DiError {
        DiError::InvalidArgument {
            type_name: self.type_name,
            position,
            reason,
        }
    }
}
