//! Debug-build sanity checks on registered types.
//!
//! Purely advisory: the checks look at `type_name` output, which is not a
//! stable format, so they only ever warn.

/// Warns about registrations that are probably mistakes.
#[cfg(debug_assertions)]
pub(crate) fn check_type<T: ?Sized>() {
    let name = std::any::type_name::<T>();
    if looks_async(name) {
        tracing::warn!(
            type_name = name,
            "registered type is a future; use AsyncRegistry::register_async instead"
        );
    } else if looks_like_function(name) {
        tracing::warn!(
            type_name = name,
            "registered dependency type is a function. Are you sure that's correct?"
        );
    }
}

#[cfg(not(debug_assertions))]
pub(crate) fn check_type<T: ?Sized>() {}

fn looks_async(name: &str) -> bool {
    name.contains("core::future::future::Future") || name.contains("{async")
}

fn looks_like_function(name: &str) -> bool {
    name.starts_with("fn(")
        || name.contains("dyn core::ops::function::Fn")
        || name.contains("{{closure}}")
}
