//! Macro for process-wide registries.

/// Creates a process-wide [`Registry`](crate::Registry) inside a module.
///
/// The macro generates a module containing:
/// - a `LazyLock<Registry>` static, constructed on first use
/// - `registry()`, returning `&'static Registry` for passing to call sites
/// - free functions delegating to that registry
///
/// # Examples
///
/// ```rust
/// use factory_registry::define_registry;
///
/// define_registry!(global);
///
/// global::register(|| 42i32);
/// global::register_singleton(|| "Hello".to_string());
///
/// let num: i32 = global::load();
/// let msg: String = global::load();
///
/// assert_eq!(num, 42);
/// assert_eq!(msg, "Hello");
/// ```
///
/// # Multiple Registries
///
/// Each invocation is completely isolated:
///
/// ```rust
/// use factory_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::register(|| "db_connection".to_string());
///
/// assert!(database::load_or_nil::<String>().is_some());
/// assert!(cache::load_or_nil::<String>().is_none());
/// ```
///
/// # Handle Usage
///
/// ```rust
/// use factory_registry::{define_registry, Registry, RegistryApi};
///
/// define_registry!(app);
///
/// fn port(registry: &Registry) -> u16 {
///     registry.load()
/// }
///
/// app::register(|| 8080u16);
/// assert_eq!(port(app::registry()), 8080);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::LazyLock;

            static REGISTRY: LazyLock<$crate::Registry> = LazyLock::new($crate::Registry::new);

            /// The process-wide registry; lives until the process exits.
            pub fn registry() -> &'static $crate::Registry {
                &REGISTRY
            }

            /// Register a factory keyed by its return type.
            pub fn register<T, F>(producer: F)
            where
                T: Send + 'static,
                F: Fn() -> T + Send + Sync + 'static,
            {
                REGISTRY.register(producer)
            }

            /// Register a factory that may fail.
            pub fn register_failable<T, E, F>(producer: F)
            where
                T: Send + 'static,
                E: Into<$crate::BoxError>,
                F: Fn() -> Result<T, E> + Send + Sync + 'static,
            {
                REGISTRY.register_failable(producer)
            }

            /// Evaluate `producer` now and store the result.
            pub fn register_singleton<T, F>(producer: F)
            where
                T: Clone + Send + Sync + 'static,
                F: FnOnce() -> T,
            {
                REGISTRY.register_singleton(producer)
            }

            /// Load a registered `T`, panicking if it is missing.
            #[track_caller]
            pub fn load<T: Send + 'static>() -> T {
                use $crate::RegistryApi;
                REGISTRY.load()
            }

            pub fn load_or_nil<T: Send + 'static>() -> Option<T> {
                use $crate::RegistryApi;
                REGISTRY.load_or_nil()
            }

            pub fn load_or_throw<T: Send + 'static>() -> Result<T, $crate::RegistryError> {
                use $crate::RegistryApi;
                REGISTRY.load_or_throw()
            }

            pub fn contains<T: 'static>() -> bool {
                REGISTRY.contains::<T>()
            }

            pub fn unregister_all() {
                REGISTRY.unregister_all()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
