//! Registry served by a single worker task.
//!
//! [`AsyncRegistry`] is a cheap, cloneable handle to a mailbox. One spawned
//! task owns the mappings and services commands one at a time, in the order
//! they arrive; every command carries a oneshot reply slot the caller awaits.
//! Resolution runs inside the worker, so an async factory that awaits keeps
//! every other caller queued until it completes. There is no cancellation or
//! timeout: dropping the caller's future does not stop a running producer.
//!
//! Singletons are still evaluated synchronously, by the caller, before the
//! registration is sent.
//!
//! A producer runs inside the worker, so it cannot call back into its own
//! registry: such a request would wait on the worker that is waiting on the
//! producer. Requests made from within the worker task fail immediately with
//! [`RegistryError::Reentrant`]. A producer that hands the request to another
//! task and awaits it still deadlocks. Resolve what a producer needs up front
//! and capture it instead.
//!
//! A producer that panics does not take the worker down: the panic is carried
//! back and resumed in the caller that requested the value.
//!
//! # Examples
//!
//! ```
//! use factory_registry::AsyncRegistry;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = AsyncRegistry::new();
//! registry
//!     .register_async(|| async { "connected".to_string() })
//!     .await;
//!
//! let status: String = registry.load().await;
//! assert_eq!(status, "connected");
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

use crate::entry::{self, AnyValue, AsyncFactoryFn, AsyncFailableFn, Entry};
use crate::lint;
use crate::registry_error::{fail_fast, BoxError, RegistryError};
use crate::registry_event::Tier;
use crate::resolve::{narrow_erased, Dependencies, Exact, Nullable, Request, Tables};
use crate::type_key::TypeKey;

/// Mailbox capacity used by [`AsyncRegistry::new`].
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

type AsyncEntry = Entry<AsyncFactoryFn, AsyncFailableFn>;
type Narrow = fn(AnyValue) -> Option<AnyValue>;

/// Outcome of a resolution inside the worker; `Err` carries a producer panic.
type Resolution = Result<Option<AnyValue>, Box<dyn Any + Send>>;

tokio::task_local! {
    /// Key being resolved by the worker, set while a producer runs.
    static RESOLVING: TypeKey;
}

/// Producer mappings as seen by [`AsyncRegistry::dependencies`].
pub type AsyncDependencies = Dependencies<AsyncFactoryFn, AsyncFailableFn>;

enum Command {
    Register {
        key: TypeKey,
        entry: AsyncEntry,
        reply: oneshot::Sender<()>,
    },
    Resolve {
        key: TypeKey,
        alternate: TypeKey,
        narrow: Narrow,
        reply: oneshot::Sender<Resolution>,
    },
    Contains {
        key: TypeKey,
        alternate: TypeKey,
        reply: oneshot::Sender<bool>,
    },
    Dependencies {
        reply: oneshot::Sender<AsyncDependencies>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
}

struct Worker {
    tables: Tables<AsyncFactoryFn, AsyncFailableFn>,
    inbox: mpsc::Receiver<Command>,
}

impl Worker {
    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            self.handle(command).await;
        }
        tracing::debug!("async registry worker stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Register { key, entry, reply } => {
                let (tier, replaced) = match entry {
                    Entry::Singleton(produce) => (
                        Tier::Singleton,
                        self.tables.singletons.insert(key, produce).is_some(),
                    ),
                    Entry::Factory(produce) => (
                        Tier::Factory,
                        self.tables.factories.insert(key, produce).is_some(),
                    ),
                    Entry::Failable(produce) => (
                        Tier::Failable,
                        self.tables.failables.insert(key, produce).is_some(),
                    ),
                };
                tracing::debug!(%tier, type_name = key.type_name(), replaced, "registered dependency");
                let _ = reply.send(());
            }
            Command::Resolve {
                key,
                alternate,
                narrow,
                reply,
            } => {
                let entries = self.tables.entries(key, alternate);
                let resolution = RESOLVING
                    .scope(key, resolve_entries(key, entries, narrow))
                    .await;
                if resolution.is_err() {
                    tracing::warn!(type_name = key.type_name(), "producer panicked");
                }
                let _ = reply.send(resolution);
            }
            Command::Contains {
                key,
                alternate,
                reply,
            } => {
                let _ = reply.send(self.tables.contains(key, alternate));
            }
            Command::Dependencies { reply } => {
                let _ = reply.send(self.tables.dependencies());
            }
            Command::Clear { reply } => {
                self.tables.clear();
                tracing::debug!("cleared registry");
                let _ = reply.send(());
            }
        }
    }
}

/// Async counterpart of [`crate::resolve`]'s blocking walk: same order, same
/// fall-through, but factories are awaited and panics are caught.
async fn resolve_entries(key: TypeKey, entries: Vec<AsyncEntry>, narrow: Narrow) -> Resolution {
    for entry in entries {
        let produced = AssertUnwindSafe(produce(key, entry)).catch_unwind().await?;
        if let Some(value) = produced.and_then(narrow) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

async fn produce(key: TypeKey, entry: AsyncEntry) -> Option<AnyValue> {
    match entry {
        Entry::Singleton(produce) => Some(produce()),
        Entry::Factory(produce) => Some(produce().await),
        Entry::Failable(produce) => match produce().await {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(
                    type_name = key.type_name(),
                    error = %err,
                    "failable factory did not produce a value"
                );
                None
            }
        },
    }
}

/// Handle to a registry owned by a single worker task.
#[derive(Clone)]
pub struct AsyncRegistry {
    mailbox: mpsc::Sender<Command>,
}

impl AsyncRegistry {
    /// Spawn the worker with [`DEFAULT_MAILBOX_CAPACITY`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_mailbox_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Spawn the worker with a bounded mailbox of `capacity` pending commands.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, or if `capacity` is zero.
    pub fn with_mailbox_capacity(capacity: usize) -> Self {
        let (mailbox, inbox) = mpsc::channel(capacity);
        tokio::spawn(
            Worker {
                tables: Tables::default(),
                inbox,
            }
            .run(),
        );
        Self { mailbox }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RegistryError> {
        if let Ok(outer) = RESOLVING.try_with(|key| *key) {
            let err = RegistryError::Reentrant {
                type_name: outer.type_name(),
            };
            tracing::error!(error = %err, "nested async registry request");
            return Err(err);
        }

        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(command(reply))
            .await
            .map_err(|_| RegistryError::Closed)?;
        response.await.map_err(|_| RegistryError::Closed)
    }

    async fn insert(&self, key: TypeKey, entry: AsyncEntry) {
        let sent = self
            .request(|reply| Command::Register { key, entry, reply })
            .await;
        if let Err(err) = sent {
            tracing::warn!(type_name = key.type_name(), error = %err, "registration dropped");
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Register a blocking factory in the Factory tier.
    pub async fn register<T, F>(&self, producer: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.insert(TypeKey::of::<T>(), Entry::Factory(entry::async_factory(producer)))
            .await;
    }

    /// Register an async factory in the Factory tier, keyed by its output type.
    pub async fn register_async<T, F, Fut>(&self, producer: F)
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.insert(
            TypeKey::of::<T>(),
            Entry::Factory(entry::async_factory_from_future(producer)),
        )
        .await;
    }

    pub async fn register_failable<T, E, F>(&self, producer: F)
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        lint::check_type::<T>();
        self.insert(TypeKey::of::<T>(), Entry::Failable(entry::async_failable(producer)))
            .await;
    }

    /// Register an async factory that may fail, keyed by its success type.
    pub async fn register_failable_async<T, E, F, Fut>(&self, producer: F)
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.insert(
            TypeKey::of::<T>(),
            Entry::Failable(entry::async_failable_from_future(producer)),
        )
        .await;
    }

    /// Evaluate `producer` immediately and store the value as a singleton.
    pub async fn register_singleton<T, F>(&self, producer: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        lint::check_type::<T>();
        let singleton = entry::singleton(producer());
        self.insert(TypeKey::of::<T>(), Entry::Singleton(singleton))
            .await;
    }

    // -------------------------------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------------------------------

    /// Resolves a typed request inside the worker.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when every tier and both key forms are exhausted
    /// - [`RegistryError::Reentrant`] when called from a producer of this registry
    /// - [`RegistryError::Closed`] when the worker has stopped
    ///
    /// # Panics
    ///
    /// Resumes the panic of a producer that panicked while resolving.
    pub async fn resolve<R: Request>(&self) -> Result<R::Output, RegistryError> {
        let key = R::key();
        let resolution = self
            .request(|reply| Command::Resolve {
                key,
                alternate: R::alternate_key(),
                narrow: narrow_erased::<R>,
                reply,
            })
            .await?;
        let value = match resolution {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        };

        let result = value
            .and_then(|value| value.downcast::<R::Output>().ok())
            .map(|value| *value)
            .ok_or(RegistryError::NotFound {
                type_name: key.type_name(),
            });

        tracing::trace!(
            type_name = key.type_name(),
            found = result.is_ok(),
            "resolved dependency"
        );
        result
    }

    /// # Panics
    ///
    /// Panics if nothing resolves for `T`.
    pub async fn load<T: Send + 'static>(&self) -> T {
        fail_fast(self.load_or_throw::<T>().await)
    }

    pub async fn load_or_nil<T: Send + 'static>(&self) -> Option<T> {
        self.load_or_throw::<T>().await.ok()
    }

    pub async fn load_or_throw<T: Send + 'static>(&self) -> Result<T, RegistryError> {
        self.resolve::<Exact<T>>().await
    }

    /// # Panics
    ///
    /// Panics if neither `Option<T>` nor `T` has a registration.
    pub async fn load_optional<T: Send + 'static>(&self) -> Option<T> {
        fail_fast(self.load_optional_or_throw::<T>().await)
    }

    pub async fn load_optional_or_nil<T: Send + 'static>(&self) -> Option<Option<T>> {
        self.load_optional_or_throw::<T>().await.ok()
    }

    pub async fn load_optional_or_throw<T: Send + 'static>(
        &self,
    ) -> Result<Option<T>, RegistryError> {
        self.resolve::<Nullable<T>>().await
    }

    // -------------------------------------------------------------------------------------------------
    // Introspection & maintenance
    // -------------------------------------------------------------------------------------------------

    pub async fn contains<T: 'static>(&self) -> bool {
        self.request(|reply| Command::Contains {
            key: TypeKey::of::<T>(),
            alternate: TypeKey::optional_of::<T>(),
            reply,
        })
        .await
        .unwrap_or(false)
    }

    /// Current factory and failable-factory mappings; empty once the worker stopped.
    pub async fn dependencies(&self) -> AsyncDependencies {
        self.request(|reply| Command::Dependencies { reply })
            .await
            .unwrap_or_else(|_| Tables::default().dependencies())
    }

    pub async fn unregister_all(&self) {
        if let Err(err) = self.request(|reply| Command::Clear { reply }).await {
            tracing::warn!(error = %err, "clear dropped");
        }
    }
}

impl Default for AsyncRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sync_factory_in_async_registry() {
        let registry = AsyncRegistry::new();
        registry.register(|| 1u8).await;
        assert_eq!(registry.load::<u8>().await, 1);
    }

    #[tokio::test]
    async fn test_singleton_precedence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let registry = AsyncRegistry::new();
        registry
            .register_async(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async { 1u32 }
            })
            .await;
        registry.register_singleton(|| 2u32).await;

        assert_eq!(registry.load::<u32>().await, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failable_async_error_is_not_found() {
        let registry = AsyncRegistry::new();
        registry
            .register_failable_async(|| async { Err::<u8, _>(std::io::Error::other("down")) })
            .await;

        assert_eq!(
            registry.load_or_throw::<u8>().await,
            Err(RegistryError::NotFound { type_name: "u8" })
        );
    }

    #[tokio::test]
    async fn test_clear_and_dependencies() {
        let registry = AsyncRegistry::new();
        assert!(registry.dependencies().await.is_empty());

        registry.register_async(|| async { 3i64 }).await;
        assert_eq!(registry.dependencies().await.len(), 1);
        assert!(registry.contains::<i64>().await);

        registry.unregister_all().await;
        assert!(registry.dependencies().await.is_empty());
        assert_eq!(registry.load_or_nil::<i64>().await, None);
    }

    #[tokio::test]
    #[should_panic(expected = "cannot find dependency")]
    async fn test_load_missing_panics() {
        AsyncRegistry::new().load::<String>().await;
    }

    #[tokio::test]
    async fn test_clones_share_worker() {
        let registry = AsyncRegistry::with_mailbox_capacity(1);
        let other = registry.clone();
        registry.register(|| "shared".to_string()).await;
        assert_eq!(other.load::<String>().await, "shared");
    }

    #[tokio::test]
    async fn test_panicking_producer_keeps_worker_alive() {
        let registry = AsyncRegistry::new();
        registry.register(|| -> u8 { panic!("boom") }).await;
        registry.register(|| 7u16).await;

        let caller = registry.clone();
        let outcome = tokio::spawn(async move { caller.load_or_throw::<u8>().await }).await;
        assert!(outcome.is_err_and(|err| err.is_panic()));

        assert_eq!(registry.load::<u16>().await, 7);
        assert!(registry.contains::<u8>().await);
    }

    #[tokio::test]
    async fn test_nested_request_is_rejected() {
        let registry = AsyncRegistry::new();
        registry.register(|| 2u32).await;

        let inner = registry.clone();
        registry
            .register_async(move || {
                let inner = inner.clone();
                async move { inner.load_or_throw::<u32>().await }
            })
            .await;

        let nested = registry.load::<Result<u32, RegistryError>>().await;
        assert!(matches!(nested, Err(RegistryError::Reentrant { .. })));
        assert_eq!(registry.load::<u32>().await, 2);
    }

    #[test]
    fn test_dropped_runtime_reports_closed() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let registry = {
            let _guard = runtime.enter();
            AsyncRegistry::new()
        };
        drop(runtime);

        assert_eq!(
            futures::executor::block_on(registry.load_or_throw::<u8>()),
            Err(RegistryError::Closed)
        );
    }
}
