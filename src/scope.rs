//! Lifecycle scoping and per-resolution state
//!
//! A *resolution tree* is everything materialized while serving one
//! top-level resolve call. It owns the in-flight binding stack used for cycle
//! detection and the cache backing [`Lifetime::Request`]. Both are keyed on
//! binding ids rather than tokens: a child binding may wrap the parent's
//! binding for the same token without that counting as a cycle. Trees live in a
//! thread-local slot: nested resolves on the same thread (from factories,
//! constructors or deferred handles) join the active tree, while concurrent
//! resolutions on other threads never observe it.

use crate::factory::Instance;
use crate::token::Token;
use crate::{DiError, Result};
use ahash::RandomState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Lifecycle policy of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// One instance per binding, cached after the first resolve
    Singleton,

    /// New instance on every resolve
    #[default]
    Transient,

    /// One instance per resolution tree
    Request,
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
            Lifetime::Request => "request",
        })
    }
}

/// Unique resolution tree identifier.
///
/// Each top-level resolve gets a fresh ID for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionId(u64);

impl ResolutionId {
    /// Generate a new unique ID.
    #[inline]
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resolution-{}", self.0)
    }
}

struct ResolutionTree {
    id: ResolutionId,
    stack: Vec<(u64, Token)>,
    request_cache: HashMap<u64, Instance, RandomState>,
}

impl ResolutionTree {
    fn new() -> Self {
        Self {
            id: ResolutionId::next(),
            stack: Vec::new(),
            request_cache: HashMap::with_hasher(RandomState::new()),
        }
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<ResolutionTree>> = const { RefCell::new(None) };
}

/// Fail if the binding `id` (answering for `token`) is already being
/// materialized in the active tree.
pub(crate) fn check_cycle(id: u64, token: &Token) -> Result<()> {
    ACTIVE.with(|active| {
        let active = active.borrow();
        let Some(tree) = active.as_ref() else {
            return Ok(());
        };
        let Some(start) = tree.stack.iter().position(|(entry, _)| *entry == id) else {
            return Ok(());
        };

        let mut path: Vec<String> = tree.stack[start..]
            .iter()
            .map(|(_, entry)| entry.to_string())
            .collect();
        path.push(token.to_string());

        #[cfg(feature = "logging")]
        debug!(
            target: "bindery",
            token = %token,
            resolution = %tree.id,
            path = ?path,
            "Circular dependency detected"
        );

        Err(DiError::CircularDependency {
            token: token.to_string(),
            path,
        })
    })
}

/// The ID of the tree active on this thread, if any
pub fn current_resolution() -> Option<ResolutionId> {
    ACTIVE.with(|active| active.borrow().as_ref().map(|tree| tree.id))
}

/// Membership in the active resolution tree.
///
/// Entering pushes a binding onto the in-flight stack (opening a tree if none is
/// active); dropping pops it and, for the guard that opened the tree, discards
/// the tree with its request cache. Release happens on every exit path,
/// including errors and panics, so a failed resolve leaves the container
/// usable.
pub(crate) struct ResolutionGuard {
    pushed: bool,
    root: bool,
}

impl ResolutionGuard {
    /// Push binding `id` (answering for `token`) onto the active tree
    pub(crate) fn enter(id: u64, token: Token) -> Self {
        let mut guard = Self::tree();
        ACTIVE.with(|active| {
            if let Some(tree) = active.borrow_mut().as_mut() {
                tree.stack.push((id, token));
                guard.pushed = true;
            }
        });
        guard
    }

    /// Join the active tree without pushing a token, opening one if needed
    pub(crate) fn tree() -> Self {
        let root = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.is_some() {
                return false;
            }
            let tree = ResolutionTree::new();

            #[cfg(feature = "logging")]
            trace!(target: "bindery", resolution = %tree.id, "Opening resolution tree");

            *active = Some(tree);
            true
        });
        Self {
            pushed: false,
            root,
        }
    }

    /// Pop this guard's token while staying in the tree
    pub(crate) fn release_token(&mut self) {
        if self.pushed {
            ACTIVE.with(|active| {
                if let Some(tree) = active.borrow_mut().as_mut() {
                    tree.stack.pop();
                }
            });
            self.pushed = false;
        }
    }

    /// Instance cached for a request-scoped binding in this tree
    pub(crate) fn request_cached(&self, key: u64) -> Option<Instance> {
        ACTIVE.with(|active| {
            active
                .borrow()
                .as_ref()
                .and_then(|tree| tree.request_cache.get(&key).cloned())
        })
    }

    /// Cache a request-scoped instance for the rest of this tree
    pub(crate) fn cache_request(&self, key: u64, instance: Instance) {
        ACTIVE.with(|active| {
            if let Some(tree) = active.borrow_mut().as_mut() {
                tree.request_cache.insert(key, instance);
            }
        });
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        self.release_token();
        if self.root {
            ACTIVE.with(|active| {
                let closed = active.borrow_mut().take();

                #[cfg(feature = "logging")]
                if let Some(tree) = closed.as_ref() {
                    trace!(
                        target: "bindery",
                        resolution = %tree.id,
                        request_instances = tree.request_cache.len(),
                        "Closing resolution tree"
                    );
                }

                drop(closed);
            });
        }
    }
}
