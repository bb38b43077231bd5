//! Integration tests for `AsyncRegistry`.
//!
//! Every test spawns its own worker inside the test runtime.

mod common;

use common::{Console, Counter, FailableDependency, Named, ThrowingDependency};
use factory_registry::{AsyncRegistry, RegistryError, TypeKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn test_save_load_with_closure() {
    let registry = AsyncRegistry::new();
    registry.register(|| Counter::new(1)).await;

    let counter: Arc<Counter> = registry.load().await;
    assert_eq!(counter.value(), 1);
    counter.set_value(90);

    assert_eq!(registry.load::<Arc<Counter>>().await.value(), 1);
    assert!(registry.load_or_nil::<Arc<Counter>>().await.is_some());
    assert!(registry.load_or_throw::<Arc<Counter>>().await.is_ok());
}

#[tokio::test]
async fn test_async_factory_awaits_initialisation() {
    let registry = AsyncRegistry::new();
    registry
        .register_async(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Counter::new(1)
        })
        .await;

    assert_eq!(registry.load::<Arc<Counter>>().await.value(), 1);
}

#[tokio::test]
async fn test_singleton_with_closure() {
    let registry = AsyncRegistry::new();
    registry.register_singleton(|| Counter::new(1)).await;

    let counter: Arc<Counter> = registry.load().await;
    counter.set_value(90);

    for _ in 0..3 {
        assert_eq!(registry.load::<Arc<Counter>>().await.value(), 90);
    }
}

#[tokio::test]
async fn test_protocol_save_and_load() {
    let registry = AsyncRegistry::new();
    registry
        .register(|| Arc::new(Console) as Arc<dyn Named>)
        .await;

    let named: Arc<dyn Named> = registry.load().await;
    assert_eq!(named.name(), "console");
}

#[tokio::test]
async fn test_failable_async_success_and_failure() {
    let registry = AsyncRegistry::new();
    registry
        .register_failable_async(|| async { ThrowingDependency::new(2) })
        .await;
    assert_eq!(
        registry.load_or_throw::<ThrowingDependency>().await,
        Ok(ThrowingDependency { value: 2 })
    );

    registry
        .register_failable_async(|| async { ThrowingDependency::new(-2) })
        .await;
    assert!(matches!(
        registry.load_or_throw::<ThrowingDependency>().await,
        Err(RegistryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_blocking_failable_factory() {
    let registry = AsyncRegistry::new();
    registry
        .register_failable(|| ThrowingDependency::new(4))
        .await;

    assert_eq!(registry.load::<ThrowingDependency>().await.value, 4);
}

#[tokio::test]
async fn test_optional_fallback() {
    let registry = AsyncRegistry::new();
    registry
        .register_async(|| async { FailableDependency::new(-1) })
        .await;

    assert_eq!(registry.load_optional::<FailableDependency>().await, None);
    assert_eq!(
        registry.load_optional_or_nil::<FailableDependency>().await,
        Some(None)
    );
    assert!(registry.load_or_nil::<FailableDependency>().await.is_none());

    registry
        .register_async(|| async { FailableDependency::new(1) })
        .await;
    assert_eq!(
        registry.load::<FailableDependency>().await,
        FailableDependency { value: 1 }
    );
}

#[tokio::test]
async fn test_unregister_dependencies() {
    let registry = AsyncRegistry::new();
    registry
        .register(|| Arc::new(Console) as Arc<dyn Named>)
        .await;
    assert!(registry.load_or_nil::<Arc<dyn Named>>().await.is_some());

    registry.unregister_all().await;
    assert!(registry.load_or_nil::<Arc<dyn Named>>().await.is_none());
}

#[tokio::test]
async fn test_dependencies_method() {
    let registry = AsyncRegistry::new();
    assert!(registry.dependencies().await.is_empty());

    registry
        .register(|| Arc::new(Console) as Arc<dyn Named>)
        .await;
    let dependencies = registry.dependencies().await;
    assert!(dependencies.contains_key(&TypeKey::of::<Arc<dyn Named>>()));

    registry.unregister_all().await;
    assert!(registry.dependencies().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolutions_are_serialized() {
    let registry = AsyncRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    registry
        .register_async(move || {
            let log = log_clone.clone();
            async move {
                log.lock().unwrap().push("start");
                tokio::time::sleep(Duration::from_millis(10)).await;
                log.lock().unwrap().push("end");
                1u8
            }
        })
        .await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.load::<u8>().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 1);
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 8);
    for pair in log.chunks(2) {
        assert_eq!(pair, ["start", "end"]);
    }
}

#[tokio::test]
async fn test_factory_invoked_per_load() {
    let registry = AsyncRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    registry
        .register(move || calls_clone.fetch_add(1, Ordering::SeqCst))
        .await;

    for _ in 0..3 {
        let _: usize = registry.load().await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_panicking_producer_only_unwinds_its_caller() {
    let registry = AsyncRegistry::new();
    registry.register(|| "kept".to_string()).await;
    registry
        .register_async(|| async {
            let value: Option<u8> = None;
            value.expect("producer blew up")
        })
        .await;

    let caller = registry.clone();
    let outcome = tokio::spawn(async move { caller.load_or_throw::<u8>().await }).await;
    assert!(outcome.is_err_and(|err| err.is_panic()));

    // The worker keeps its registrations and accepts new ones.
    assert_eq!(registry.load_or_throw::<String>().await, Ok("kept".to_string()));
    registry.register(|| 16u16).await;
    assert_eq!(registry.load::<u16>().await, 16);
}

#[tokio::test]
async fn test_factory_calling_back_into_registry_fails_fast() {
    let registry = AsyncRegistry::new();
    registry.register(|| 2u32).await;

    let inner = registry.clone();
    registry
        .register_failable_async(move || {
            let inner = inner.clone();
            async move {
                inner
                    .load_or_throw::<u32>()
                    .await
                    .map(|base| u64::from(base) * 10)
            }
        })
        .await;

    let result = tokio::time::timeout(Duration::from_secs(2), registry.load_or_throw::<u64>())
        .await
        .expect("nested request must not hang the worker");
    assert_eq!(result, Err(RegistryError::NotFound { type_name: "u64" }));

    assert_eq!(registry.load::<u32>().await, 2);
}

#[tokio::test]
#[should_panic(expected = "cannot call back into the async registry while it resolves u64")]
async fn test_nested_load_panics_in_outer_caller() {
    let registry = AsyncRegistry::new();
    registry.register(|| 2u32).await;

    let inner = registry.clone();
    registry
        .register_async(move || {
            let inner = inner.clone();
            async move { u64::from(inner.load::<u32>().await) * 10 }
        })
        .await;

    let _ = registry.load_or_throw::<u64>().await;
}
