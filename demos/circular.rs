//! Example demonstrating cycle detection and deferred references
//!
//! Run with:
//!   cargo run --example circular

use bindery::{
    Arguments, Constructible, Container, Deferred, DiError, ParamSpec, TypeDescriptor,
};
use std::sync::Arc;

struct ServiceA {
    b: Arc<ServiceB>,
}

struct ServiceB {
    a: Arc<ServiceA>,
}

impl Constructible for ServiceA {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .param(ParamSpec::new("B"))
            .build(|args: &Arguments| Ok(Self { b: args.get(0)? }))
    }
}

impl Constructible for ServiceB {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .param(ParamSpec::new("A"))
            .build(|args: &Arguments| Ok(Self { a: args.get(0)? }))
    }
}

// Same graph, with A's dependency on B deferred
struct LazyA {
    b: Deferred<LazyB>,
}

struct LazyB {
    a: Arc<LazyA>,
}

impl Constructible for LazyA {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .param(ParamSpec::new("B").deferred())
            .build(|args: &Arguments| Ok(Self { b: args.deferred(0)? }))
    }
}

impl Constructible for LazyB {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .param(ParamSpec::new("A"))
            .build(|args: &Arguments| Ok(Self { a: args.get(0)? }))
    }
}

fn root_cause(err: &DiError) -> &DiError {
    match err {
        DiError::DependencyResolution { source, .. } => root_cause(source),
        other => other,
    }
}

fn main() {
    println!("=== Eager cycle ===");
    let eager = Container::new();
    eager.bind("A").to_constructed::<ServiceA>().in_singleton_scope();
    eager.bind("B").to_constructed::<ServiceB>().in_singleton_scope();

    match eager.resolve::<ServiceA>("A") {
        Ok(a) => println!("unexpected success: {}", Arc::strong_count(&a.b.a)),
        Err(err) => {
            println!("error: {err}");
            if let DiError::CircularDependency { path, .. } = root_cause(&err) {
                println!("path: {}", path.join(" -> "));
            }
        }
    }

    println!("\n=== Deferred cycle ===");
    let lazy = Container::new();
    lazy.bind("A").to_constructed::<LazyA>().in_singleton_scope();
    lazy.bind("B").to_constructed::<LazyB>().in_singleton_scope();

    let b = lazy.resolve::<LazyB>("B").unwrap();
    println!("B resolved, A's handle resolved: {}", b.a.b.is_resolved());

    let b_again = b.a.b.get().unwrap();
    println!("A.b is B: {}", Arc::ptr_eq(&b, &b_again));
    println!("token: {}", b.a.b.token());
}
