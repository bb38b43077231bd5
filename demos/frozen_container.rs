//! Configure-then-freeze example.
//!
//! Demonstrates:
//! - Building an `ImmutableRegistry` from a `RegistryBuilder`
//! - That builds are independent snapshots
//! - Sharing a frozen registry across threads without locking
//!
//! Run with: `cargo run --example frozen_container`

use factory_registry::{ImmutableRegistry, RegistryApi};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}

struct Czech;

impl Greeter for Czech {
    fn greet(&self, name: &str) -> String {
        format!("Ahoj, {name}!")
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    println!("=== factory-registry: Frozen Container ===\n");

    let mut builder = ImmutableRegistry::builder();
    builder
        .register(|| Arc::new(English) as Arc<dyn Greeter>)
        .register_singleton(|| "world".to_string());
    let english = builder.build();

    // Later changes only reach registries built afterwards.
    builder.register(|| Arc::new(Czech) as Arc<dyn Greeter>);
    let czech = builder.build();

    let handles: Vec<_> = [english, czech]
        .into_iter()
        .map(|registry| {
            std::thread::spawn(move || {
                let greeter: Arc<dyn Greeter> = registry.load();
                greeter.greet(&registry.load::<String>())
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(greeting) => println!("   {greeting}"),
            Err(_) => println!("   worker panicked"),
        }
    }

    println!("\n=== Example Complete ===");
}
