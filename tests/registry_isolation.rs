//! Integration tests for registry isolation.
//!
//! Every `define_registry!` invocation and every `Registry::new()` owns its
//! own mappings; nothing registered in one is visible from another.

use factory_registry::{define_registry, Registry, RegistryApi};
use std::sync::{Arc, Mutex};

#[test]
fn test_multiple_isolated_registries() {
    define_registry!(database);
    define_registry!(cache);
    define_registry!(config);

    database::register(|| "postgresql://localhost".to_string());
    cache::register(|| "redis://localhost".to_string());
    config::register_singleton(|| "app_config".to_string());

    assert_eq!(database::load::<String>(), "postgresql://localhost");
    assert_eq!(cache::load::<String>(), "redis://localhost");
    assert_eq!(config::load::<String>(), "app_config");
}

#[test]
fn test_registry_does_not_leak_between_instances() {
    define_registry!(isolated_a);
    define_registry!(isolated_b);

    isolated_a::register(|| "only in A".to_string());

    assert!(isolated_a::contains::<String>());
    assert!(!isolated_b::contains::<String>());
    assert!(isolated_b::load_or_throw::<String>().is_err());
}

#[test]
fn test_multiple_types_in_multiple_registries() {
    define_registry!(multi_a);
    define_registry!(multi_b);

    multi_a::register(|| 42i32);
    multi_a::register(|| "hello".to_string());

    multi_b::register(|| std::f64::consts::PI);
    multi_b::register_singleton(|| true);

    assert!(multi_a::contains::<i32>());
    assert!(multi_a::contains::<String>());
    assert!(!multi_a::contains::<f64>());
    assert!(!multi_a::contains::<bool>());

    assert!(multi_b::contains::<f64>());
    assert!(multi_b::contains::<bool>());
    assert!(!multi_b::contains::<i32>());
    assert!(!multi_b::contains::<String>());
}

#[test]
fn test_registry_scoping() {
    mod module_a {
        use factory_registry::define_registry;
        define_registry!(scoped);

        pub fn setup() {
            scoped::register(|| "module A".to_string());
        }

        pub fn value() -> String {
            scoped::load()
        }
    }

    mod module_b {
        use factory_registry::define_registry;
        define_registry!(scoped);

        pub fn setup() {
            scoped::register(|| "module B".to_string());
        }

        pub fn value() -> String {
            scoped::load()
        }
    }

    module_a::setup();
    module_b::setup();

    assert_eq!(module_a::value(), "module A");
    assert_eq!(module_b::value(), "module B");
}

#[test]
fn test_instances_are_isolated() {
    let first = Registry::new();
    let second = Registry::new();

    first.register(|| 1u8);
    second.register(|| 2u8);
    first.unregister_all();

    assert_eq!(first.load_or_nil::<u8>(), None);
    assert_eq!(second.load::<u8>(), 2);
}

#[test]
fn test_registry_with_tracing_isolation() {
    define_registry!(traced_a);
    define_registry!(traced_b);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced_a::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    traced_a::register(|| 1i32);
    traced_b::register(|| 2i32);

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0], "register { tier: factory, type_name: i32 }");
}
