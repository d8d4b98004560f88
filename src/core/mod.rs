//! Core state machine types.
//!
//! This module contains the value types a machine works with:
//! - State and Event definitions via blanket traits
//! - Transition records
//! - Constructors for mapper output streams
//!
//! Nothing in this module spawns tasks or holds locks; the running
//! machine lives in [`crate::runtime`].

mod state;
pub mod states;
mod transition;

pub use state::{Event, State};
pub use states::StateStream;
pub use transition::Transition;
