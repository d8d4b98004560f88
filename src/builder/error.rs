//! Build errors for state machines.

use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Neither an initial state nor a checkpoint was given
    #[error("Initial state not specified. Call .initial(state) or .resume(checkpoint)")]
    MissingInitialState,

    /// No mapper was given
    #[error("Mapper not specified. Call .mapper(fn) before .build()")]
    MissingMapper,

    /// `build` was called outside a tokio runtime
    #[error("No tokio runtime available. Build the machine from within a runtime context")]
    NoRuntime,
}
