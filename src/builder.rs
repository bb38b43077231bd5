//! Configure-then-freeze registries.
//!
//! [`RegistryBuilder`] accumulates registrations without any locking; `&mut self`
//! keeps it single-owner. [`RegistryBuilder::build`] copies the current mappings
//! into an [`ImmutableRegistry`], so later builder changes never reach a
//! registry that was already built.
//!
//! # Examples
//!
//! ```
//! use factory_registry::{RegistryApi, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(|| 8080u16)
//!     .register_singleton(|| "localhost".to_string());
//!
//! let registry = builder.build();
//! assert_eq!(registry.load::<u16>(), 8080);
//! assert_eq!(registry.load::<String>(), "localhost");
//! ```

use std::sync::Arc;

use crate::entry::{self, Entry};
use crate::lint;
use crate::registry_error::BoxError;
use crate::registry_event::Tier;
use crate::registry_trait::RegistryApi;
use crate::resolve::{Dependencies, Tables};
use crate::type_key::TypeKey;

/// Mutable accumulation phase of a frozen registry.
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    tables: Tables,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn registered(&mut self, tier: Tier, key: TypeKey, replaced: bool) -> &mut Self {
        tracing::debug!(%tier, type_name = key.type_name(), replaced, "builder registration");
        self
    }

    pub fn register<T, F>(&mut self, producer: F) -> &mut Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_keyed(TypeKey::of::<T>(), producer)
    }

    pub fn register_keyed<T, F>(&mut self, key: TypeKey, producer: F) -> &mut Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .factories
            .insert(key, entry::factory(producer))
            .is_some();
        self.registered(Tier::Factory, key, replaced)
    }

    pub fn register_failable<T, E, F>(&mut self, producer: F) -> &mut Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_failable_keyed(TypeKey::of::<T>(), producer)
    }

    pub fn register_failable_keyed<T, E, F>(&mut self, key: TypeKey, producer: F) -> &mut Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .failables
            .insert(key, entry::failable(producer))
            .is_some();
        self.registered(Tier::Failable, key, replaced)
    }

    /// Evaluate `producer` now; every registry built afterwards shares the value.
    pub fn register_singleton<T, F>(&mut self, producer: F) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        lint::check_type::<T>();
        self.register_singleton_keyed(TypeKey::of::<T>(), producer)
    }

    pub fn register_singleton_keyed<T, F>(&mut self, key: TypeKey, producer: F) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let replaced = self
            .tables
            .singletons
            .insert(key, entry::singleton(producer()))
            .is_some();
        self.registered(Tier::Singleton, key, replaced)
    }

    /// Freeze the current registrations into a new, independent registry.
    pub fn build(&self) -> ImmutableRegistry {
        tracing::debug!(
            singletons = self.tables.singletons.len(),
            factories = self.tables.factories.len(),
            failables = self.tables.failables.len(),
            "building immutable registry"
        );
        ImmutableRegistry::from_tables(self.tables.clone())
    }
}

/// Frozen registry produced by [`RegistryBuilder::build`].
///
/// Never mutated after construction, so it is shared across threads without a
/// lock. Cloning is cheap and yields a handle to the same registrations.
#[derive(Clone)]
pub struct ImmutableRegistry {
    tables: Arc<Tables>,
}

impl ImmutableRegistry {
    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.tables
            .contains(TypeKey::of::<T>(), TypeKey::optional_of::<T>())
    }

    pub fn dependencies(&self) -> Dependencies {
        self.tables.dependencies()
    }
}

impl RegistryApi for ImmutableRegistry {
    fn entries(&self, key: TypeKey, alternate: TypeKey) -> Vec<Entry> {
        self.tables.entries(key, alternate)
    }
}
