//! Running state machines.
//!
//! This module is the imperative shell around the value types in
//! [`crate::core`]: it owns the per-machine event queue, the drain task that
//! applies a mapper's output, and the handles callers use to talk to it.
//!
//! # Key Concepts
//!
//! - **StateMachine**: cloneable handle; `add`, `current_state`, `dispose`
//! - **Mapper**: turns `(context, event)` into a stream of candidate states
//! - **Hooks**: optional per-machine callbacks for events, transitions, errors
//!
//! Every machine runs one tokio task. Events of one machine never overlap;
//! different machines run independently.

mod context;
mod hooks;
mod machine;
mod queue;

pub use context::{Context, Mapper};
pub use hooks::{ErrorHook, EventHook, Hooks, TransitionHook};
pub use machine::{StateMachine, StateSubscription};
