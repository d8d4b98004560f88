//! Cross-cutting observation of every machine.
//!
//! An [`Observer`] receives every accepted event, every emitted transition
//! and every error of each machine attached to the same [`ObserverHub`].
//! Machines with different event and state types can share one hub, so
//! payloads arrive type-erased as [`Payload`] values that can be rendered to
//! JSON or downcast back to their concrete type.
//!
//! Observer panics are isolated: the hub catches them, logs them and keeps
//! going, so a faulty observer can neither corrupt machine state nor stop an
//! event queue.

mod history;
mod hub;
mod logging;

pub use history::{Observation, ObservationKind, ObservationLog};
pub use hub::ObserverHub;
pub use logging::LoggingObserver;

use crate::error::MachineError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use uuid::Uuid;

/// Identity of a machine instance as seen by observers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineRef {
    /// Unique per instance, fresh for every build.
    pub id: Uuid,
    /// Configured name; not required to be unique.
    pub name: String,
}

impl MachineRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MachineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// Type-erased event or transition handed to observers.
pub trait Payload: Debug + Send + Sync {
    /// Access the concrete value for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Render the value as JSON.
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T> Payload for T
where
    T: Debug + Serialize + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl dyn Payload + '_ {
    /// Downcast to the concrete payload type.
    ///
    /// ```rust
    /// use statebus::core::Transition;
    /// use statebus::observer::Payload;
    ///
    /// let transition = Transition::new(0u32, "increment", 1u32);
    /// let payload: &dyn Payload = &transition;
    /// let back = payload.downcast_ref::<Transition<&'static str, u32>>().unwrap();
    /// assert_eq!(back.next_state, 1);
    /// ```
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Render as a JSON string, falling back to the debug form.
    pub fn render(&self) -> String {
        match self.to_json() {
            Ok(value) => value.to_string(),
            Err(_) => format!("{:?}", self),
        }
    }
}

/// Receiver of events, transitions and errors from many machines.
///
/// Every method defaults to a no-op, so implementors override only what
/// they need.
pub trait Observer: Send + Sync {
    /// Called when a machine accepts an event, before it is queued.
    fn on_event(&self, _machine: &MachineRef, _event: &dyn Payload) {}

    /// Called after a machine applied a transition and ran its own hook.
    fn on_transition(&self, _machine: &MachineRef, _transition: &dyn Payload) {}

    /// Called after a machine ran its own error hook.
    fn on_error(&self, _machine: &MachineRef, _error: &MachineError) {}
}

/// Observer that ignores everything. The default of every hub.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Run a hook, converting a panic into an error that is logged and returned.
pub(crate) fn isolate<F>(
    hook: &'static str,
    machine: &MachineRef,
    f: F,
) -> Result<(), MachineError>
where
    F: FnOnce(),
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|panic| {
        let message = panic_message(panic.as_ref());
        tracing::error!(
            machine = %machine.name,
            id = %machine.id,
            hook,
            "hook panicked: {}",
            message
        );
        MachineError::ObserverPanicked { hook, message }
    })
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
