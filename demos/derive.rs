//! Example demonstrating #[derive(Constructible)]
//!
//! Run with:
//!   cargo run --example derive --features derive

use bindery::{Constructible, Container, Deferred, InjectableOptions, Lifetime, Property, Token};
use std::sync::Arc;

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct Cache {
    size: usize,
}

struct Logger {
    level: String,
}

struct Mailer;

// Constructor injection, optional and deferred dependencies
#[derive(Constructible)]
struct UserService {
    #[inject]
    db: Arc<Database>,
    #[inject(token = "cache")]
    cache: Arc<Cache>,
    #[inject(optional)]
    logger: Option<Arc<Logger>>,
    #[inject(deferred)]
    mailer: Deferred<Mailer>,
    // Non-injected field uses Default
    request_count: u64,
}

// Setter injection closes the cycle between the two singletons
#[derive(Constructible)]
struct Orders {
    #[inject]
    users: Arc<UserService>,
    #[inject(property)]
    audit: Property<Audit>,
}

#[derive(Constructible)]
struct Audit {
    #[inject(property)]
    orders: Property<Orders>,
}

fn main() {
    let container = Container::new();

    container.bind(Token::of::<Database>()).to_value(Database {
        url: "postgres://localhost/app".into(),
    });
    container.bind("cache").to_value(Cache { size: 1024 });
    container.bind(Token::of::<Logger>()).to_value(Logger {
        level: "info".into(),
    });
    container
        .bind(Token::of::<Mailer>())
        .to_factory(|_| {
            println!("Mailer created on first use");
            Ok(Mailer)
        })
        .in_singleton_scope();

    // Explicit binding
    container
        .bind(Token::of::<UserService>())
        .to_constructed::<UserService>()
        .in_singleton_scope();

    // Auto-resolved on first request
    container
        .injectables()
        .register::<Orders>(InjectableOptions::new().lifetime(Lifetime::Singleton));
    container
        .injectables()
        .register::<Audit>(InjectableOptions::new().lifetime(Lifetime::Singleton));

    let users = container.get::<UserService>().unwrap();
    println!("UserService created:");
    println!("  db.url = {}", users.db.url);
    println!("  cache.size = {}", users.cache.size);
    println!(
        "  logger = {:?}",
        users.logger.as_ref().map(|logger| logger.level.as_str())
    );
    println!("  request_count = {}", users.request_count);
    println!("  mailer resolved = {}", users.mailer.is_resolved());
    let _mailer = users.mailer.get().unwrap();
    println!("  mailer resolved = {}", users.mailer.is_resolved());

    let orders = container.get::<Orders>().unwrap();
    let audit = orders.audit.get().unwrap();
    let back = audit.orders.get().unwrap();
    println!("\nOrders <-> Audit cycle closed: {}", Arc::ptr_eq(&orders, &back));
}
