//! Basic usage example for factory-registry.
//!
//! Demonstrates:
//! - Registering factories, failable factories and singletons
//! - Loading values with `load()`, `load_or_nil()` and `load_or_throw()`
//! - The `Option<T>` fallback between key forms
//! - Checking registration status with `contains()`
//!
//! Run with: `RUST_LOG=debug cargo run --example basic_usage`

use factory_registry::{define_registry, RegistryApi};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// Create an isolated registry for this example
define_registry!(app);

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("no port configured")]
struct MissingPort;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    println!("=== factory-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Factories run on every load
    // -------------------------------------------------------------------------
    println!("1. Registering a counting factory...");

    let next_id = Arc::new(AtomicU32::new(1));
    let ids = next_id.clone();
    app::register(move || ids.fetch_add(1, Ordering::SeqCst));

    let first: u32 = app::load();
    let second: u32 = app::load();
    println!("   Two loads produced ids {first} and {second}");

    // -------------------------------------------------------------------------
    // 2. Singletons are evaluated once
    // -------------------------------------------------------------------------
    println!("\n2. Registering a singleton...");

    app::register_singleton(|| AppConfig {
        name: "MyApp".to_string(),
        version: 1,
        debug_mode: true,
    });
    let config: AppConfig = app::load();
    println!(
        "   AppConfig: {} v{} (debug: {})",
        config.name, config.version, config.debug_mode
    );

    // -------------------------------------------------------------------------
    // 3. Failable factories fall back to NotFound
    // -------------------------------------------------------------------------
    println!("\n3. Registering a failable factory...");

    app::register_failable(|| Err::<u16, _>(MissingPort));
    match app::load_or_throw::<u16>() {
        Ok(port) => println!("   Port: {port}"),
        Err(e) => println!("   Error (expected): {e}"),
    }

    // -------------------------------------------------------------------------
    // 4. Optional producers serve plain requests when they yield a value
    // -------------------------------------------------------------------------
    println!("\n4. Registering an Option<String> factory...");

    app::register(|| std::env::var("USER").ok());
    let registry = app::registry();
    println!("   load_optional::<String>() = {:?}", registry.load_optional::<String>());
    println!("   load_or_nil::<String>()   = {:?}", app::load_or_nil::<String>());

    // -------------------------------------------------------------------------
    // 5. Check registration status with contains()
    // -------------------------------------------------------------------------
    println!("\n5. Checking registration status with contains()...");

    println!("   contains::<u32>()       = {}", app::contains::<u32>());
    println!("   contains::<AppConfig>() = {}", app::contains::<AppConfig>());
    println!("   contains::<Vec<u8>>()   = {}", app::contains::<Vec<u8>>());

    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------
    app::unregister_all();
    println!("\n=== Example Complete ===");
    println!("Registry cleared; contains::<u32>() = {}", app::contains::<u32>());
}
