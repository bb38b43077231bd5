//! Core trait defining load behavior.
//!
//! This module provides the `RegistryApi` trait with default implementations for
//! every retrieval variant. Implementors only expose their candidate entries; the
//! precedence walk, narrowing and event emission live here so the mutable, frozen
//! and minimal registries cannot drift apart.

use crate::entry::Entry;
use crate::registry_error::{fail_fast, RegistryError};
use crate::registry_event::RegistryEvent;
use crate::resolve::{resolve_entries, Exact, Nullable, Request};
use crate::type_key::TypeKey;

/// Core trait defining load behavior.
///
/// Requires a single accessor, `entries`, returning at most one candidate per
/// tier in precedence order (see [`crate::resolve`]).
pub trait RegistryApi {
    /// Candidate entries for `key`, falling back to `alternate` per tier.
    ///
    /// Implementations must return owned entries so producers run without any
    /// registry lock held.
    fn entries(&self, key: TypeKey, alternate: TypeKey) -> Vec<Entry>;

    /// Hook for registry-level tracing. The default does nothing.
    fn emit_event(&self, _event: &RegistryEvent) {}

    /// Resolves a typed request through Singleton > Factory > Failable.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when every tier and both key forms are exhausted
    fn resolve<R: Request>(&self) -> Result<R::Output, RegistryError> {
        let key = R::key();
        let result = resolve_entries::<R>(self.entries(key, R::alternate_key())).ok_or(
            RegistryError::NotFound {
                type_name: key.type_name(),
            },
        );

        tracing::trace!(
            type_name = key.type_name(),
            found = result.is_ok(),
            "resolved dependency"
        );
        self.emit_event(&RegistryEvent::Load {
            type_name: key.type_name(),
            found: result.is_ok(),
        });

        result
    }

    /// Load a `T` that must be registered.
    ///
    /// # Panics
    ///
    /// Panics with `cannot find dependency for type <T>` if nothing resolves.
    #[track_caller]
    fn load<T: Send + 'static>(&self) -> T {
        fail_fast(self.load_or_throw::<T>())
    }

    /// Load a `T`, returning `None` if nothing resolves.
    fn load_or_nil<T: Send + 'static>(&self) -> Option<T> {
        self.load_or_throw::<T>().ok()
    }

    /// Load a `T`, surfacing a missing dependency as an error.
    fn load_or_throw<T: Send + 'static>(&self) -> Result<T, RegistryError> {
        self.resolve::<Exact<T>>()
    }

    /// Load the optional form of `T`.
    ///
    /// An `Option<T>` producer yielding `None` is a successful, absent result;
    /// only a missing registration panics.
    #[track_caller]
    fn load_optional<T: Send + 'static>(&self) -> Option<T> {
        fail_fast(self.load_optional_or_throw::<T>())
    }

    fn load_optional_or_nil<T: Send + 'static>(&self) -> Option<Option<T>> {
        self.load_optional_or_throw::<T>().ok()
    }

    fn load_optional_or_throw<T: Send + 'static>(&self) -> Result<Option<T>, RegistryError> {
        self.resolve::<Nullable<T>>()
    }
}
