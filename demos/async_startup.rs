//! Async registry example.
//!
//! Demonstrates:
//! - Registering async factories that await during construction
//! - Loading from several tasks; resolutions are served one at a time
//! - Failable async factories surfacing `NotFound`
//!
//! Run with: `RUST_LOG=factory_registry=debug cargo run --example async_startup`

use factory_registry::AsyncRegistry;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Connection {
    url: String,
}

#[derive(Debug, thiserror::Error)]
#[error("cache is offline")]
struct CacheOffline;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    println!("=== factory-registry: Async Startup ===\n");

    let registry = AsyncRegistry::new();
    registry
        .register_async(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Connection {
                url: "postgresql://localhost".to_string(),
            }
        })
        .await;
    registry
        .register_failable_async(|| async { Err::<String, _>(CacheOffline) })
        .await;

    let started = Instant::now();
    let tasks: Vec<_> = (0..3)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let connection: Connection = registry.load().await;
                println!("   task {i} connected to {}", connection.url);
            })
        })
        .collect();
    for task in tasks {
        let _ = task.await;
    }
    println!("   three serialized connections took {:?}", started.elapsed());

    match registry.load_or_throw::<String>().await {
        Ok(value) => println!("   cache: {value}"),
        Err(e) => println!("   Error (expected): {e}"),
    }

    println!("\n=== Example Complete ===");
}
