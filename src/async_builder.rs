//! Builder that async tasks can share while registering.
//!
//! [`AsyncRegistryBuilder`] is a cloneable handle; every clone registers into
//! the same mappings behind a `tokio::sync::Mutex`, so several tasks may
//! configure it at once. [`AsyncRegistryBuilder::build`] copies the mappings
//! into an [`ImmutableRegistry`], exactly like [`crate::RegistryBuilder::build`].
//!
//! Producers are the blocking kind; the built registry resolves synchronously.
//!
//! # Examples
//!
//! ```
//! use factory_registry::{AsyncRegistryBuilder, RegistryApi};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let builder = AsyncRegistryBuilder::new();
//! builder
//!     .register(|| 8080u16)
//!     .await
//!     .register_singleton(|| "localhost".to_string())
//!     .await;
//!
//! let registry = builder.build().await;
//! assert_eq!(registry.load::<u16>(), 8080);
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::builder::ImmutableRegistry;
use crate::entry;
use crate::lint;
use crate::registry_error::BoxError;
use crate::registry_event::Tier;
use crate::resolve::Tables;
use crate::type_key::TypeKey;

/// Shared, task-safe accumulation phase of a frozen registry.
#[derive(Clone, Default)]
pub struct AsyncRegistryBuilder {
    tables: Arc<Mutex<Tables>>,
}

impl AsyncRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn registered(&self, tier: Tier, key: TypeKey, replaced: bool) -> &Self {
        tracing::debug!(%tier, type_name = key.type_name(), replaced, "async builder registration");
        self
    }

    pub async fn register<T, F>(&self, producer: F) -> &Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_keyed(TypeKey::of::<T>(), producer).await
    }

    pub async fn register_keyed<T, F>(&self, key: TypeKey, producer: F) -> &Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .lock()
            .await
            .factories
            .insert(key, entry::factory(producer))
            .is_some();
        self.registered(Tier::Factory, key, replaced)
    }

    pub async fn register_failable<T, E, F>(&self, producer: F) -> &Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.register_failable_keyed(TypeKey::of::<T>(), producer)
            .await
    }

    pub async fn register_failable_keyed<T, E, F>(&self, key: TypeKey, producer: F) -> &Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let replaced = self
            .tables
            .lock()
            .await
            .failables
            .insert(key, entry::failable(producer))
            .is_some();
        self.registered(Tier::Failable, key, replaced)
    }

    /// Evaluate `producer` now, before waiting for the lock.
    pub async fn register_singleton<T, F>(&self, producer: F) -> &Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        lint::check_type::<T>();
        self.register_singleton_keyed(TypeKey::of::<T>(), producer)
            .await
    }

    pub async fn register_singleton_keyed<T, F>(&self, key: TypeKey, producer: F) -> &Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let singleton = entry::singleton(producer());
        let replaced = self
            .tables
            .lock()
            .await
            .singletons
            .insert(key, singleton)
            .is_some();
        self.registered(Tier::Singleton, key, replaced)
    }

    /// Freeze the current registrations into a new, independent registry.
    ///
    /// Registrations still in flight on other tasks land in later builds only.
    pub async fn build(&self) -> ImmutableRegistry {
        let tables = self.tables.lock().await.clone();
        tracing::debug!(
            singletons = tables.singletons.len(),
            factories = tables.factories.len(),
            failables = tables.failables.len(),
            "building immutable registry"
        );
        ImmutableRegistry::from_tables(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry_trait::RegistryApi;

    #[derive(Debug, thiserror::Error)]
    #[error("value {0} is negative")]
    struct Negative(i32);

    #[tokio::test]
    async fn test_chained_registration() {
        let builder = AsyncRegistryBuilder::new();
        builder
            .register(|| 1u8)
            .await
            .register_failable(|| Ok::<_, Negative>(2u16))
            .await
            .register_singleton(|| 3u32)
            .await;

        let registry = builder.build().await;
        assert_eq!(registry.load::<u8>(), 1);
        assert_eq!(registry.load::<u16>(), 2);
        assert_eq!(registry.load::<u32>(), 3);
    }

    #[tokio::test]
    async fn test_failing_factory_is_not_found() {
        let builder = AsyncRegistryBuilder::new();
        builder.register_failable(|| Err::<i32, _>(Negative(-2))).await;

        let registry = builder.build().await;
        assert!(registry.load_or_throw::<i32>().is_err());
        assert!(registry.contains::<i32>());
    }

    #[tokio::test]
    async fn test_clones_share_mappings() {
        let builder = AsyncRegistryBuilder::new();
        let other = builder.clone();
        other.register(|| "shared".to_string()).await;

        assert_eq!(builder.build().await.load::<String>(), "shared");
    }

    #[tokio::test]
    async fn test_keyed_registration() {
        let builder = AsyncRegistryBuilder::new();
        builder
            .register_keyed(TypeKey::optional_of::<u8>(), || Some(4u8))
            .await;

        let registry = builder.build().await;
        assert_eq!(registry.load::<u8>(), 4);
        assert_eq!(registry.load_optional::<u8>(), Some(4));
    }
}
