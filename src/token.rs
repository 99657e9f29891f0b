//! Tokens identify what a binding produces.
//!
//! A [`Token`] is the key a container looks bindings up by. String and symbol
//! tokens compare by value, type tokens by [`TypeId`], and [`InjectionToken`]s
//! by handle identity: two handles created with the same description are
//! still distinct keys.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a Rust type used as a token or as a constructible type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for type `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, for diagnostics only
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A named handle compared by identity.
///
/// Clones share identity with the original; separately created handles never
/// compare equal, even with identical descriptions.
///
/// # Examples
///
/// ```rust
/// use bindery::{InjectionToken, Token};
///
/// let a = InjectionToken::new("Logger");
/// let b = InjectionToken::new("Logger");
///
/// assert_ne!(Token::from(&a), Token::from(&b));
/// assert_eq!(Token::from(&a), Token::from(a.clone()));
/// ```
#[derive(Clone)]
pub struct InjectionToken {
    id: u64,
    description: Arc<str>,
}

impl InjectionToken {
    /// Create a new, unique handle.
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    /// Human-readable description
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for InjectionToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InjectionToken {}

impl Hash for InjectionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for InjectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InjectionToken({}#{})", self.description, self.id)
    }
}

impl fmt::Display for InjectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InjectionToken({})", self.description)
    }
}

/// Key used to bind and resolve dependencies.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Plain string key
    Name(Arc<str>),
    /// Symbolic handle, compared by its name
    Symbol(&'static str),
    /// A Rust type
    Type(TypeKey),
    /// Identity-compared handle
    Injection(InjectionToken),
    /// Named variant of another token
    Named { base: Arc<Token>, name: Arc<str> },
}

impl Token {
    /// Token for type `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Type(TypeKey::of::<T>())
    }

    /// Symbolic token
    #[inline]
    pub const fn symbol(name: &'static str) -> Self {
        Token::Symbol(name)
    }

    /// Named variant of this token.
    ///
    /// `Token::of::<Db>().named("primary")` and `Token::of::<Db>().named("replica")`
    /// are distinct keys, and both differ from `Token::of::<Db>()`.
    pub fn named(self, name: impl Into<Arc<str>>) -> Self {
        Token::Named {
            base: Arc::new(self),
            name: name.into(),
        }
    }

    /// The type key if this is a type token
    #[inline]
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Token::Type(key) => Some(*key),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => f.write_str(name),
            Token::Symbol(name) => write!(f, "Symbol({name})"),
            Token::Type(key) => f.write_str(key.name()),
            Token::Injection(token) => fmt::Display::fmt(token, f),
            Token::Named { base, name } => write!(f, "{base}:{name}"),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Injection(token) => fmt::Debug::fmt(token, f),
            other => write!(f, "Token({other})"),
        }
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Name(Arc::from(name))
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Name(Arc::from(name))
    }
}

impl From<TypeKey> for Token {
    fn from(key: TypeKey) -> Self {
        Token::Type(key)
    }
}

impl From<InjectionToken> for Token {
    fn from(token: InjectionToken) -> Self {
        Token::Injection(token)
    }
}

impl From<&InjectionToken> for Token {
    fn from(token: &InjectionToken) -> Self {
        Token::Injection(token.clone())
    }
}

impl From<&Token> for Token {
    fn from(token: &Token) -> Self {
        token.clone()
    }
}
