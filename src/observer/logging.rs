//! Observer that writes every notification to `tracing`.

use super::{MachineRef, Observer, Payload};
use crate::error::MachineError;

/// Logs events and transitions at `info`, errors at `warn`.
///
/// Payloads are rendered as JSON, so a transition shows up as
/// `{"currentState":0,"event":"increment","nextState":1}`.
#[derive(Clone, Copy, Debug)]
pub struct LoggingObserver {
    include_events: bool,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            include_events: true,
        }
    }

    /// Log only transitions and errors.
    pub fn transitions_only() -> Self {
        Self {
            include_events: false,
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LoggingObserver {
    fn on_event(&self, machine: &MachineRef, event: &dyn Payload) {
        if self.include_events {
            tracing::info!(
                machine = %machine.name,
                id = %machine.id,
                event = %event.render(),
                "event"
            );
        }
    }

    fn on_transition(&self, machine: &MachineRef, transition: &dyn Payload) {
        tracing::info!(
            machine = %machine.name,
            id = %machine.id,
            transition = %transition.render(),
            "transition"
        );
    }

    fn on_error(&self, machine: &MachineRef, error: &MachineError) {
        tracing::warn!(
            machine = %machine.name,
            id = %machine.id,
            code = error.error_code(),
            "error: {}",
            error
        );
    }
}
