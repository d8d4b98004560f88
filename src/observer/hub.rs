//! Shared observer registry.

use super::{isolate, MachineRef, NoopObserver, Observer, Payload};
use crate::error::MachineError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<ObserverHub>> = OnceLock::new();

/// Registry holding the single active observer for a group of machines.
///
/// Machines receive a hub at construction time. Replacing the observer is
/// treated as configuration: it is not retroactive, and a notification that
/// already cloned the previous observer out of the slot finishes with it.
///
/// # Example
///
/// ```rust
/// use statebus::observer::{LoggingObserver, ObserverHub};
/// use std::sync::Arc;
///
/// let hub = Arc::new(ObserverHub::new());
/// hub.set_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct ObserverHub {
    observer: RwLock<Arc<dyn Observer>>,
}

impl ObserverHub {
    /// Create a hub with a no-op observer.
    pub fn new() -> Self {
        Self::with_observer(Arc::new(NoopObserver))
    }

    pub fn with_observer(observer: Arc<dyn Observer>) -> Self {
        Self {
            observer: RwLock::new(observer),
        }
    }

    /// The process-wide hub used by machines that are not given one.
    pub fn global() -> Arc<ObserverHub> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ObserverHub::new())))
    }

    /// Replace the active observer. Past notifications are not replayed.
    pub fn set_observer(&self, observer: Arc<dyn Observer>) {
        *self.observer.write() = observer;
    }

    /// Restore the no-op observer.
    pub fn reset(&self) {
        self.set_observer(Arc::new(NoopObserver));
    }

    /// The currently active observer.
    pub fn observer(&self) -> Arc<dyn Observer> {
        Arc::clone(&self.observer.read())
    }

    pub fn notify_event(
        &self,
        machine: &MachineRef,
        event: &dyn Payload,
    ) -> Result<(), MachineError> {
        let observer = self.observer();
        isolate("on_event", machine, || observer.on_event(machine, event))
    }

    pub fn notify_transition(
        &self,
        machine: &MachineRef,
        transition: &dyn Payload,
    ) -> Result<(), MachineError> {
        let observer = self.observer();
        isolate("on_transition", machine, || {
            observer.on_transition(machine, transition)
        })
    }

    pub fn notify_error(
        &self,
        machine: &MachineRef,
        error: &MachineError,
    ) -> Result<(), MachineError> {
        let observer = self.observer();
        isolate("on_error", machine, || observer.on_error(machine, error))
    }
}

impl Default for ObserverHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHub").finish_non_exhaustive()
    }
}
