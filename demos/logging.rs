//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use bindery::{Container, Token};

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct RequestContext {
    request_id: String,
}

fn main() {
    // JSON with logging-json, pretty with logging-pretty; TRACE shows every resolve
    bindery::logging::builder().trace().bindery_only().from_env().init();

    println!("=== bindery Logging Demo ===\n");

    // logs: "Creating new root container"
    let container = Container::new();

    // logs: "Registering binding"
    container.bind(Token::of::<Database>()).to_value(Database {
        url: "postgres://localhost/mydb".into(),
    });
    container
        .bind("request")
        .to_factory(|_| {
            println!("  [App] Request context being created...");
            Ok(RequestContext {
                request_id: "default".into(),
            })
        })
        .in_singleton_scope();

    // logs the resolution tree and the singleton cache hit on the second call
    let _db = container.get::<Database>().unwrap();
    let _ctx = container.resolve::<RequestContext>("request").unwrap();
    let _ctx = container.resolve::<RequestContext>("request").unwrap();

    // logs: "Resolution failed"
    assert!(container.try_resolve::<u32>("missing").is_none());

    // logs: "Creating child container"
    let request_scope = container.create_child_container();
    request_scope.bind("request").to_value(RequestContext {
        request_id: "req-12345".into(),
    });

    // Local override, then parent fallthrough
    let _ctx = request_scope.resolve::<RequestContext>("request").unwrap();
    let _db_from_child = request_scope.get::<Database>().unwrap();

    // A factory that resolves itself
    container
        .bind("loop")
        .to_factory(|c: &Container| c.resolve::<u32>("loop").map(|n| *n))
        .in_transient_scope();
    // logs: "Circular dependency detected"
    let err = container.resolve::<u32>("loop").unwrap_err();
    println!("  [App] {err}");

    // logs: "Unbinding token"
    request_scope.unbind("request");

    println!("\n=== Demo Complete ===");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
