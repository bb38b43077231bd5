//! Registry with only the Factory and Singleton tiers.

use parking_lot::Mutex;

use crate::entry::{self, Entry};
use crate::lint;
use crate::registry_event::{RegistryEvent, Tier, TraceHook};
use crate::registry_trait::RegistryApi;
use crate::resolve::{Dependencies, Tables};
use crate::type_key::TypeKey;

/// Lightweight thread-safe registry without failable factories.
///
/// Resolution order is Singleton > Factory; loading works exactly as on
/// [`crate::Registry`].
#[derive(Default)]
pub struct MiniRegistry {
    tables: Mutex<Tables>,
    trace: TraceHook,
}

impl MiniRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

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

    fn cleared(&self, tier: Option<Tier>) {
        match tier {
            Some(tier) => tracing::debug!(%tier, "cleared mapping"),
            None => tracing::debug!("cleared registry"),
        }
        self.trace.emit(&RegistryEvent::Clear { tier });
    }

    pub fn register<T, F>(&self, producer: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        let key = TypeKey::of::<T>();
        let replaced = self
            .tables
            .lock()
            .factories
            .insert(key, entry::factory(producer))
            .is_some();
        self.registered(Tier::Factory, key, replaced);
    }

    pub fn register_singleton<T, F>(&self, producer: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        lint::check_type::<T>();
        let key = TypeKey::of::<T>();
        let singleton = entry::singleton(producer());
        let replaced = self
            .tables
            .lock()
            .singletons
            .insert(key, singleton)
            .is_some();
        self.registered(Tier::Singleton, key, replaced);
    }

    /// Remove every factory; singletons are kept.
    pub fn unregister_dependencies(&self) {
        self.tables.lock().factories.clear();
        self.cleared(Some(Tier::Factory));
    }

    /// Remove every singleton; factories are kept.
    pub fn unregister_singletons(&self) {
        self.tables.lock().singletons.clear();
        self.cleared(Some(Tier::Singleton));
    }

    pub fn unregister_all(&self) {
        self.tables.lock().clear();
        self.cleared(None);
    }

    pub fn dependencies(&self) -> Dependencies {
        self.tables.lock().dependencies()
    }
}

impl RegistryApi for MiniRegistry {
    fn entries(&self, key: TypeKey, alternate: TypeKey) -> Vec<Entry> {
        self.tables.lock().entries(key, alternate)
    }

    fn emit_event(&self, event: &RegistryEvent) {
        self.trace.emit(event);
    }
}
