//! Statebus: an event-driven state machine library
//!
//! A machine holds one immutable state at a time. Callers push events into
//! it; a mapper turns each event and the current state into zero or more
//! candidate next states, and every candidate that differs from the state
//! before it becomes a [`Transition`]. Events of one machine are processed
//! strictly one after another, in the order they were accepted.
//!
//! # Core Concepts
//!
//! - **State / Event**: any serializable value, see [`core`]
//! - **Mapper**: `(context, event) -> stream of states`, see [`runtime::Mapper`]
//! - **Transition**: `{currentState, event, nextState}` record of one change
//! - **Hooks**: per-machine callbacks, see [`runtime::Hooks`]
//! - **Observer**: cross-machine fan-out through an [`ObserverHub`]
//!
//! # Example
//!
//! ```rust
//! use statebus::core::states;
//! use statebus::observer::{ObservationLog, ObserverHub};
//! use statebus::{Context, StateMachine};
//! use serde::Serialize;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Serialize)]
//! enum CounterEvent {
//!     Increment,
//!     Decrement,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let log = Arc::new(ObservationLog::new());
//! let hub = Arc::new(ObserverHub::with_observer(log.clone()));
//!
//! let counter = StateMachine::builder()
//!     .initial(0i64)
//!     .mapper(|ctx: &Context<CounterEvent, i64>, event| match event {
//!         CounterEvent::Increment => states::once(ctx.state() + 1),
//!         CounterEvent::Decrement => states::once(ctx.state() - 1),
//!     })
//!     .observer_hub(hub)
//!     .name("counter")
//!     .build()
//!     .unwrap();
//!
//! counter.add(CounterEvent::Increment).unwrap();
//! counter.add(CounterEvent::Increment).unwrap();
//! counter.add(CounterEvent::Decrement).unwrap();
//! counter.flush().await.unwrap();
//!
//! assert_eq!(counter.current_state(), 1);
//! assert_eq!(log.transitions(counter.machine_ref().id).len(), 3);
//! # }
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod error;
pub mod observer;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::MachineConfig;
pub use crate::core::{Event, State, StateStream, Transition};
pub use error::{BoxError, MachineError};
pub use observer::{MachineRef, Observer, ObserverHub};
pub use runtime::{Context, Hooks, Mapper, StateMachine, StateSubscription};
