use thiserror::Error;

/// Boxed error produced by a failable factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No tier produced a value of the requested type under either key form.
    #[error("cannot find dependency for type {type_name}")]
    NotFound { type_name: &'static str },

    /// The async registry's worker task is no longer running.
    #[error("registry worker has stopped")]
    Closed,

    /// A producer running inside the async registry's worker called back into
    /// the same registry.
    #[error("cannot call back into the async registry while it resolves {type_name}")]
    Reentrant { type_name: &'static str },
}

/// Unwraps a resolution result, panicking with the diagnostic on failure.
///
/// Backs every `load` method: a missing dependency at a `load` call site is a
/// wiring bug in the embedding application.
#[track_caller]
pub(crate) fn fail_fast<T>(result: Result<T, RegistryError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "required dependency is missing");
            panic!("{err}");
        }
    }
}
