//! # Factory Registry
//!
//! A type-keyed object registry: register factories (or fixed instances) under
//! a type, then load a value of that type wherever it is needed.
//!
//! ## Quick Start
//!
//! ```rust
//! use factory_registry::{Registry, RegistryApi};
//!
//! let registry = Registry::new();
//! registry.register(|| "Hello, World!".to_string());
//!
//! let message: String = registry.load();
//! assert_eq!(message, "Hello, World!");
//! ```
//!
//! ## Resolution
//!
//! Three independent mappings are consulted in a fixed order:
//! singletons, then factories, then failable factories. Inside each mapping
//! the requested type `T` is looked up first and `Option<T>` second, so a
//! producer returning `Option<T>` also serves plain `T` requests whenever it
//! yields `Some`. A failing producer, or a value of the wrong type, moves on to
//! the next mapping; exhausting all of them is [`RegistryError::NotFound`].
//!
//! ## Retrieval Variants
//!
//! - [`RegistryApi::load`] - panics when the dependency is missing
//! - [`RegistryApi::load_or_nil`] - returns `None` instead
//! - [`RegistryApi::load_or_throw`] - returns `Err(RegistryError::NotFound)`
//! - [`RegistryApi::load_optional`] and friends - request `Option<T>`
//!
//! ## Registries
//!
//! - [`Registry`] - mutable, one mutex around every operation
//! - [`RegistryBuilder`] / [`ImmutableRegistry`] - configure, then freeze
//! - [`MiniRegistry`] - singletons and plain factories only
//! - [`AsyncRegistry`] - single worker task, async factories
//! - [`AsyncRegistryBuilder`] - shared between tasks while configuring, then frozen
//! - [`define_registry!`] - a process-wide [`Registry`] with free functions

mod async_builder;
mod async_registry;
mod builder;
mod entry;
mod lint;
mod macros;
mod mini;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;
pub mod resolve;
mod type_key;

pub use async_builder::AsyncRegistryBuilder;
pub use async_registry::{AsyncDependencies, AsyncRegistry, DEFAULT_MAILBOX_CAPACITY};
pub use builder::{ImmutableRegistry, RegistryBuilder};
pub use entry::{AnyValue, AsyncFactoryFn, AsyncFailableFn, Entry, FactoryFn, FailableFn, SingletonFn};
pub use mini::MiniRegistry;
pub use registry::Registry;
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::{RegistryEvent, Tier, TraceCallback};
pub use registry_trait::RegistryApi;
pub use resolve::{Dependencies, Exact, Nullable, Request};
pub use type_key::TypeKey;
