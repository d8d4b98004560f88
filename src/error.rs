//! Runtime error types.

use thiserror::Error;

/// Boxed error type yielded by mappers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by a running state machine.
#[derive(Debug, Error)]
pub enum MachineError {
    /// The machine was disposed; the event or flush was rejected.
    #[error("state machine '{name}' is closed")]
    Closed { name: String },

    /// The mapper returned an error or panicked for an event.
    #[error("mapping failed for event {event}: {source}")]
    Mapping {
        event: String,
        #[source]
        source: BoxError,
    },

    /// An observer or local hook panicked.
    #[error("observer panicked in {hook}: {message}")]
    ObserverPanicked { hook: &'static str, message: String },
}

impl MachineError {
    /// Returns whether this error was caused by the caller using a disposed machine.
    pub fn is_closed(&self) -> bool {
        matches!(self, MachineError::Closed { .. })
    }

    /// Returns a short stable code for logs and observers.
    pub fn error_code(&self) -> &'static str {
        match self {
            MachineError::Closed { .. } => "CLOSED",
            MachineError::Mapping { .. } => "MAPPING_FAILED",
            MachineError::ObserverPanicked { .. } => "OBSERVER_PANICKED",
        }
    }
}
