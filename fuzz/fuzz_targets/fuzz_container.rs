#![no_main]

//! Fuzz target for binding and resolution on a single container
//!
//! Random binding sequences over a small token space, including bindings
//! that depend on each other and form cycles.

use arbitrary::Arbitrary;
use bindery::{Container, DiError, Lifetime, Token};
use libfuzzer_sys::fuzz_target;

const TOKENS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Clone, Copy, Debug, Arbitrary)]
enum Slot {
    A,
    B,
    C,
    D,
}

impl Slot {
    fn token(self) -> Token {
        Token::from(TOKENS[self as usize])
    }
}

#[derive(Clone, Copy, Debug, Arbitrary)]
enum FuzzLifetime {
    Singleton,
    Transient,
    Request,
}

impl From<FuzzLifetime> for Lifetime {
    fn from(lifetime: FuzzLifetime) -> Self {
        match lifetime {
            FuzzLifetime::Singleton => Lifetime::Singleton,
            FuzzLifetime::Transient => Lifetime::Transient,
            FuzzLifetime::Request => Lifetime::Request,
        }
    }
}

/// Operations to perform on the container
#[derive(Debug, Arbitrary)]
enum ContainerOp {
    BindValue(Slot, u32),
    BindFactory(Slot, FuzzLifetime),
    // Factory that resolves another slot
    BindDependent(Slot, Slot, FuzzLifetime),
    BindFailing(Slot),
    Rebind(Slot, u32),
    Unbind(Slot),
    Resolve(Slot),
    TryResolve(Slot),
    IsBound(Slot),
    Len,
}

fuzz_target!(|ops: Vec<ContainerOp>| {
    let container = Container::new();

    for op in ops.into_iter().take(200) {
        match op {
            ContainerOp::BindValue(slot, value) => {
                container.bind(slot.token()).to_value(value);
            }
            ContainerOp::BindFactory(slot, lifetime) => {
                container
                    .bind(slot.token())
                    .to_factory(|_| Ok(0u32))
                    .in_lifetime(lifetime.into());
            }
            ContainerOp::BindDependent(slot, dep, lifetime) => {
                let dep = dep.token();
                container
                    .bind(slot.token())
                    .to_factory(move |c: &Container| Ok(c.resolve::<u32>(dep.clone())?.wrapping_add(1)))
                    .in_lifetime(lifetime.into());
            }
            ContainerOp::BindFailing(slot) => {
                container
                    .bind(slot.token())
                    .to_factory(|_| -> bindery::Result<u32> { Err(DiError::ContainerDropped) })
                    .in_transient_scope();
            }
            ContainerOp::Rebind(slot, value) => {
                container.rebind(slot.token()).to_value(value);
            }
            ContainerOp::Unbind(slot) => {
                let was_bound = container.is_bound_locally(slot.token());
                assert_eq!(container.unbind(slot.token()), was_bound);
                assert!(!container.is_bound(slot.token()));
            }
            ContainerOp::Resolve(slot) => {
                let result = container.resolve::<u32>(slot.token());
                if !container.is_bound(slot.token()) {
                    assert!(result.is_err());
                }
                // The resolution stack is always unwound
                assert!(bindery::current_resolution().is_none());
            }
            ContainerOp::TryResolve(slot) => {
                let _ = container.try_resolve::<u32>(slot.token());
            }
            ContainerOp::IsBound(slot) => {
                assert_eq!(
                    container.is_bound(slot.token()),
                    container.is_bound_locally(slot.token())
                );
            }
            ContainerOp::Len => {
                assert!(container.len() <= TOKENS.len());
            }
        }
    }
});
