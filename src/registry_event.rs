use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// The mapping a registration was stored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Singleton,
    Factory,
    Failable,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Singleton => f.write_str("singleton"),
            Tier::Factory => f.write_str("factory"),
            Tier::Failable => f.write_str("failable"),
        }
    }
}

/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use factory_registry::{RegistryEvent, Tier};
///
/// let event = RegistryEvent::Register { tier: Tier::Factory, type_name: "i32" };
/// assert_eq!(event.to_string(), "register { tier: factory, type_name: i32 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A producer or value was stored.
    Register {
        /// The mapping it went into
        tier: Tier,
        /// The key's type name (e.g., "i32", "alloc::string::String")
        type_name: &'static str,
    },

    /// A resolution was attempted.
    Load {
        /// The requested type name
        type_name: &'static str,
        /// Whether some tier produced a conforming value
        found: bool,
    },

    /// A type existence check was performed.
    Contains {
        type_name: &'static str,
        found: bool,
    },

    /// A mapping was cleared; `None` means all of them.
    Clear { tier: Option<Tier> },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Register { tier, type_name } => {
                write!(f, "register {{ tier: {tier}, type_name: {type_name} }}")
            }
            RegistryEvent::Load { type_name, found } => {
                write!(f, "load {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::Contains { type_name, found } => {
                write!(f, "contains {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::Clear { tier: None } => f.write_str("clear {}"),
            RegistryEvent::Clear { tier: Some(tier) } => write!(f, "clear {{ tier: {tier} }}"),
        }
    }
}

/// Type alias for the user-supplied tracing callback.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Per-registry slot holding the optional trace callback.
#[derive(Default)]
pub(crate) struct TraceHook {
    callback: Mutex<Option<Arc<TraceCallback>>>,
}

impl TraceHook {
    pub(crate) fn set(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        *self.callback.lock() = Some(Arc::new(callback));
    }

    pub(crate) fn clear(&self) {
        *self.callback.lock() = None;
    }

    /// Invokes the callback, if any, with the slot lock already released so the
    /// callback may use the registry that emitted the event.
    pub(crate) fn emit(&self, event: &RegistryEvent) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}
