#![no_main]

//! Fuzz target for container hierarchies
//!
//! Tests child containers, overrides and parent chain resolution.

use arbitrary::Arbitrary;
use bindery::{Container, DiError};
use libfuzzer_sys::fuzz_target;

/// Operations on a hierarchy of containers
#[derive(Debug, Arbitrary)]
enum ScopedOp {
    BindInRoot(u32),
    BindSingletonInRoot,
    CreateChild,
    // Child of the most recent container
    CreateNested,
    OverrideInChild(u8, u32),
    UnbindInChild(u8),
    ResolveFromChild(u8),
    DropChild(u8),
    DropRoot,
}

fuzz_target!(|ops: Vec<ScopedOp>| {
    let mut root = Some(Container::new());
    let mut children: Vec<Container> = Vec::new();
    let mut root_value: Option<u32> = None;

    for op in ops.into_iter().take(100) {
        match op {
            ScopedOp::BindInRoot(value) => {
                if let Some(root) = &root {
                    root.bind("value").to_value(value);
                    root_value = Some(value);
                }
            }
            ScopedOp::BindSingletonInRoot => {
                if let Some(root) = &root {
                    root.bind("value")
                        .to_factory(|_| Ok(7u32))
                        .in_singleton_scope();
                    root_value = Some(7);
                }
            }
            ScopedOp::CreateChild => {
                if let Some(root) = &root {
                    children.push(root.create_child_container());
                }
            }
            ScopedOp::CreateNested => {
                let parent = children.last().cloned().or_else(|| root.clone());
                if let Some(parent) = parent {
                    let child = parent.create_child_container();
                    assert_eq!(child.depth(), parent.depth() + 1);
                    children.push(child);
                }
            }
            ScopedOp::OverrideInChild(idx, value) => {
                if let Some(child) = children.get(idx as usize % children.len().max(1)) {
                    child.bind("value").to_value(value);
                    assert_eq!(*child.resolve::<u32>("value").unwrap(), value);
                }
            }
            ScopedOp::UnbindInChild(idx) => {
                if let Some(child) = children.get(idx as usize % children.len().max(1)) {
                    child.unbind("value");
                    assert!(!child.is_bound_locally("value"));
                }
            }
            ScopedOp::ResolveFromChild(idx) => {
                if let Some(child) = children.get(idx as usize % children.len().max(1)) {
                    match child.resolve::<u32>("value") {
                        Ok(value) => {
                            if child.depth() == 1 && !child.is_bound_locally("value") {
                                assert_eq!(Some(*value), root_value);
                            }
                        }
                        Err(DiError::Unbound { .. } | DiError::ParentDropped) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            }
            ScopedOp::DropChild(idx) => {
                if !children.is_empty() {
                    let idx = idx as usize % children.len();
                    children.remove(idx);
                }
            }
            ScopedOp::DropRoot => {
                root = None;
                root_value = None;
            }
        }
    }
});
