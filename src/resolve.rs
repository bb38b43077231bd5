//! Resolution algorithm shared by every registry flavour.
//!
//! Precedence is fixed: Singleton > Factory > Failable, and inside each tier
//! the exact key is consulted before the alternate (optional) key. Only the
//! first entry found per tier is tried. A producer that fails, or a value that
//! does not narrow to the requested type, lets resolution fall through to the
//! next tier.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::entry::{AnyValue, Entry, FactoryFn, FailableFn, SingletonFn};
use crate::type_key::TypeKey;

/// A typed request: which keys to consult and how to narrow what is found.
pub trait Request: 'static {
    type Output: Send + 'static;

    fn key() -> TypeKey;

    fn alternate_key() -> TypeKey;

    /// Recovers the requested value from a produced one, or `None` when the
    /// produced value does not conform.
    fn narrow(value: AnyValue) -> Option<Self::Output>;
}

/// Request for `T`; falls back to entries keyed by `Option<T>` that produce `Some`.
pub struct Exact<T>(PhantomData<fn() -> T>);

/// Request for `Option<T>`; falls back to entries keyed by `T`.
///
/// Succeeds with `None` when an `Option<T>` producer yields nothing.
pub struct Nullable<T>(PhantomData<fn() -> T>);

impl<T: Send + 'static> Request for Exact<T> {
    type Output = T;

    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn alternate_key() -> TypeKey {
        TypeKey::optional_of::<T>()
    }

    fn narrow(value: AnyValue) -> Option<T> {
        match value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => value.downcast::<Option<T>>().ok().and_then(|value| *value),
        }
    }
}

impl<T: Send + 'static> Request for Nullable<T> {
    type Output = Option<T>;

    fn key() -> TypeKey {
        TypeKey::optional_of::<T>()
    }

    fn alternate_key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn narrow(value: AnyValue) -> Option<Option<T>> {
        match value.downcast::<Option<T>>() {
            Ok(value) => Some(*value),
            Err(value) => value.downcast::<T>().ok().map(|value| Some(*value)),
        }
    }
}

/// Narrows through `R` and re-erases the result; lets a non-generic worker
/// apply a generic request's narrowing.
pub(crate) fn narrow_erased<R: Request>(value: AnyValue) -> Option<AnyValue> {
    R::narrow(value).map(|output| Box::new(output) as AnyValue)
}

/// The three independent mappings.
pub(crate) struct Tables<Fac = FactoryFn, Fail = FailableFn> {
    pub(crate) singletons: HashMap<TypeKey, SingletonFn>,
    pub(crate) factories: HashMap<TypeKey, Fac>,
    pub(crate) failables: HashMap<TypeKey, Fail>,
}

impl<Fac, Fail> Default for Tables<Fac, Fail> {
    fn default() -> Self {
        Self {
            singletons: HashMap::new(),
            factories: HashMap::new(),
            failables: HashMap::new(),
        }
    }
}

impl<Fac: Clone, Fail: Clone> Clone for Tables<Fac, Fail> {
    fn clone(&self) -> Self {
        Self {
            singletons: self.singletons.clone(),
            factories: self.factories.clone(),
            failables: self.failables.clone(),
        }
    }
}

fn first_of<V: Clone>(map: &HashMap<TypeKey, V>, key: &TypeKey, alternate: &TypeKey) -> Option<V> {
    map.get(key).or_else(|| map.get(alternate)).cloned()
}

impl<Fac: Clone, Fail: Clone> Tables<Fac, Fail> {
    /// Candidate entries for a request, in precedence order, at most one per tier.
    pub(crate) fn entries(&self, key: TypeKey, alternate: TypeKey) -> Vec<Entry<Fac, Fail>> {
        let mut entries = Vec::with_capacity(3);
        if let Some(singleton) = first_of(&self.singletons, &key, &alternate) {
            entries.push(Entry::Singleton(singleton));
        }
        if let Some(factory) = first_of(&self.factories, &key, &alternate) {
            entries.push(Entry::Factory(factory));
        }
        if let Some(failable) = first_of(&self.failables, &key, &alternate) {
            entries.push(Entry::Failable(failable));
        }
        entries
    }

    pub(crate) fn contains(&self, key: TypeKey, alternate: TypeKey) -> bool {
        [key, alternate].iter().any(|k| {
            self.singletons.contains_key(k)
                || self.factories.contains_key(k)
                || self.failables.contains_key(k)
        })
    }

    pub(crate) fn dependencies(&self) -> Dependencies<Fac, Fail> {
        Dependencies {
            factories: self.factories.clone(),
            failables: self.failables.clone(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.singletons.clear();
        self.factories.clear();
        self.failables.clear();
    }
}

/// Runs blocking candidates in order and returns the first conforming value.
pub(crate) fn resolve_entries<R: Request>(entries: Vec<Entry>) -> Option<R::Output> {
    entries.into_iter().find_map(|entry| {
        let produced = match entry {
            Entry::Singleton(produce) => Some(produce()),
            Entry::Factory(produce) => Some(produce()),
            Entry::Failable(produce) => match produce() {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::debug!(
                        type_name = R::key().type_name(),
                        error = %err,
                        "failable factory did not produce a value"
                    );
                    None
                }
            },
        };
        produced.and_then(R::narrow)
    })
}

/// Read-only view of the factory mappings; producers are not invoked.
pub struct Dependencies<Fac = FactoryFn, Fail = FailableFn> {
    factories: HashMap<TypeKey, Fac>,
    failables: HashMap<TypeKey, Fail>,
}

impl<Fac, Fail> Dependencies<Fac, Fail> {
    pub fn factories(&self) -> &HashMap<TypeKey, Fac> {
        &self.factories
    }

    pub fn failables(&self) -> &HashMap<TypeKey, Fail> {
        &self.failables
    }

    pub fn contains_key(&self, key: &TypeKey) -> bool {
        self.factories.contains_key(key) || self.failables.contains_key(key)
    }

    /// Every key with a factory of either kind.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.factories.keys().chain(self.failables.keys())
    }

    pub fn len(&self) -> usize {
        self.factories.len() + self.failables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty() && self.failables.is_empty()
    }
}

impl<Fac, Fail> std::fmt::Debug for Dependencies<Fac, Fail> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("failables", &self.failables.keys().collect::<Vec<_>>())
            .finish()
    }
}
