//! Mutable, thread-safe registry.
//!
//! Every public operation takes the registry mutex for its own duration only,
//! so operations are individually atomic but not composable: another thread may
//! register between two of your loads.
//!
//! # Examples
//!
//! ```
//! use factory_registry::{Registry, RegistryApi};
//!
//! let registry = Registry::new();
//! registry.register(|| "Hello, World!".to_string());
//!
//! let message: String = registry.load();
//! assert_eq!(message, "Hello, World!");
//! ```

use parking_lot::Mutex;

use crate::entry::{self, Entry};
use crate::lint;
use crate::registry_error::BoxError;
use crate::registry_event::{RegistryEvent, Tier, TraceHook};
use crate::registry_trait::RegistryApi;
use crate::resolve::{Dependencies, Tables};
use crate::type_key::TypeKey;

/// Thread-safe registry holding factories, failable factories and singletons.
#[derive(Default)]
pub struct Registry {
    tables: Mutex<Tables>,
    trace: TraceHook,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked after the registry lock is released, so it may
    /// itself use this registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }

    fn registered(&self, tier: Tier, key: TypeKey, replaced: bool) {
        tracing::debug!(%tier, type_name = key.type_name(), replaced, "registered dependency");
        self.trace.emit(&RegistryEvent::Register {
            tier,
            type_name: key.type_name(),
        });
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Register a factory keyed by its return type.
    ///
    /// The producer is invoked fresh on every resolution. A previous factory for
    /// the same type is replaced.
    pub fn register<T, F>(&self, producer: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_keyed(TypeKey::of::<T>(), producer);
    }

    /// Register a factory under an explicit key.
    ///
    /// The produced value is only returned to requests it narrows to; a
    /// mismatch behaves like a missing entry.
    pub fn register_keyed<T, F>(&self, key: TypeKey, producer: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .lock()
            .factories
            .insert(key, entry::factory(producer))
            .is_some();
        self.registered(Tier::Factory, key, replaced);
    }

    /// Register a factory that may fail.
    ///
    /// A failure is not an error of the registry: resolution moves on and, with
    /// nothing else registered, reports `NotFound`.
    pub fn register_failable<T, E, F>(&self, producer: F)
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_failable_keyed(TypeKey::of::<T>(), producer);
    }

    pub fn register_failable_keyed<T, E, F>(&self, key: TypeKey, producer: F)
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .lock()
            .failables
            .insert(key, entry::failable(producer))
            .is_some();
        self.registered(Tier::Failable, key, replaced);
    }

    /// Evaluate `producer` now and store the result as a singleton.
    ///
    /// Every load hands out a clone of the stored value. Register an `Arc` to
    /// share one instance (and its interior mutations) between loads.
    pub fn register_singleton<T, F>(&self, producer: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        lint::check_type::<T>();
        self.register_singleton_keyed(TypeKey::of::<T>(), producer);
    }

    pub fn register_singleton_keyed<T, F>(&self, key: TypeKey, producer: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        // Evaluated outside the lock so the producer may load from this registry.
        let singleton = entry::singleton(producer());
        let replaced = self
            .tables
            .lock()
            .singletons
            .insert(key, singleton)
            .is_some();
        self.registered(Tier::Singleton, key, replaced);
    }

    // -------------------------------------------------------------------------------------------------
    // Introspection & maintenance
    // -------------------------------------------------------------------------------------------------

    /// Check whether any tier has an entry for `T` or `Option<T>`.
    ///
    /// No producer is invoked, so a registered failable factory counts even if
    /// it would fail.
    pub fn contains<T: 'static>(&self) -> bool {
        let found = self
            .tables
            .lock()
            .contains(TypeKey::of::<T>(), TypeKey::optional_of::<T>());

        self.trace.emit(&RegistryEvent::Contains {
            type_name: std::any::type_name::<T>(),
            found,
        });

        found
    }

    /// Current factory and failable-factory mappings.
    pub fn snapshot(&self) -> Dependencies {
        self.tables.lock().dependencies()
    }

    /// Remove every registration from all three mappings.
    ///
    /// Values already handed out stay valid.
    pub fn unregister_all(&self) {
        self.tables.lock().clear();
        tracing::debug!("cleared registry");
        self.trace.emit(&RegistryEvent::Clear { tier: None });
    }
}

impl RegistryApi for Registry {
    fn entries(&self, key: TypeKey, alternate: TypeKey) -> Vec<Entry> {
        self.tables.lock().entries(key, alternate)
    }

    fn emit_event(&self, event: &RegistryEvent) {
        self.trace.emit(event);
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
