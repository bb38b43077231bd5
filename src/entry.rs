//! Type-erased producers stored in the registry mappings.
//!
//! Every producer hands back an [`AnyValue`]; the requesting side narrows it
//! back to a concrete type (see [`crate::Request`]).

use std::any::Any;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::registry_error::BoxError;

/// A produced value before narrowing.
pub type AnyValue = Box<dyn Any + Send>;

/// Non-failing factory, invoked fresh on every resolution.
pub type FactoryFn = Arc<dyn Fn() -> AnyValue + Send + Sync>;

/// Factory that may fail with a caller-defined error.
pub type FailableFn = Arc<dyn Fn() -> Result<AnyValue, BoxError> + Send + Sync>;

/// Hands out the value captured at registration time.
pub type SingletonFn = Arc<dyn Fn() -> AnyValue + Send + Sync>;

pub type AsyncFactoryFn = Arc<dyn Fn() -> BoxFuture<'static, AnyValue> + Send + Sync>;

pub type AsyncFailableFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<AnyValue, BoxError>> + Send + Sync>;

/// One candidate producer found for a request.
///
/// `Fac` and `Fail` are the factory representations of the registry flavour:
/// plain closures for the blocking registries, future-returning ones for
/// [`crate::AsyncRegistry`].
pub enum Entry<Fac = FactoryFn, Fail = FailableFn> {
    Singleton(SingletonFn),
    Factory(Fac),
    Failable(Fail),
}

pub(crate) fn factory<T, F>(producer: F) -> FactoryFn
where
    T: Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Arc::new(move || Box::new(producer()) as AnyValue)
}

pub(crate) fn failable<T, E, F>(producer: F) -> FailableFn
where
    T: Send + 'static,
    E: Into<BoxError>,
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move || {
        producer()
            .map(|value| Box::new(value) as AnyValue)
            .map_err(Into::<BoxError>::into)
    })
}

/// Singletons are resolved by cloning the captured value; register an `Arc`
/// to share one instance between every load.
pub(crate) fn singleton<T>(value: T) -> SingletonFn
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(move || Box::new(value.clone()) as AnyValue)
}

pub(crate) fn async_factory<T, F>(producer: F) -> AsyncFactoryFn
where
    T: Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Arc::new(move || {
        let value = producer();
        futures::future::ready(Box::new(value) as AnyValue).boxed()
    })
}

pub(crate) fn async_factory_from_future<T, F, Fut>(producer: F) -> AsyncFactoryFn
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
{
    Arc::new(move || producer().map(|value| Box::new(value) as AnyValue).boxed())
}

pub(crate) fn async_failable<T, E, F>(producer: F) -> AsyncFailableFn
where
    T: Send + 'static,
    E: Into<BoxError>,
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move || {
        let result = producer()
            .map(|value| Box::new(value) as AnyValue)
            .map_err(Into::<BoxError>::into);
        futures::future::ready(result).boxed()
    })
}

pub(crate) fn async_failable_from_future<T, E, F, Fut>(producer: F) -> AsyncFailableFn
where
    T: Send + 'static,
    E: Into<BoxError>,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || {
        producer()
            .map(|result| {
                result
                    .map(|value| Box::new(value) as AnyValue)
                    .map_err(Into::<BoxError>::into)
            })
            .boxed()
    })
}
