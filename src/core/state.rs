//! State and Event traits for state machine values.
//!
//! Both traits are implemented automatically for any type that satisfies
//! their bounds, so plain enums, structs and primitives work out of the box.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for state machine states.
///
/// States are immutable snapshots of application data. A machine never
/// mutates a state in place; it replaces the current state with a new value
/// produced by its mapper.
///
/// # Required Traits
///
/// - `Clone`: States are handed out by value from `current_state()`
/// - `PartialEq`: Consecutive equal states are suppressed
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for logging
///   and checkpoints
///
/// # Example
///
/// ```rust
/// use statebus::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum TaskState {
///     Pending,
///     Running { progress: u8 },
///     Complete,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<TaskState>();
/// assert_state::<u32>();
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> State for T where
    T: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Trait for events accepted by a state machine.
///
/// An event describes something that happened. It carries no identity beyond
/// its value and is consumed by the machine's mapper.
pub trait Event: Clone + Debug + Serialize + Send + Sync + 'static {}

impl<T> Event for T where T: Clone + Debug + Serialize + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    #[derive(Clone, Debug, Serialize)]
    enum TestEvent {
        Start,
    }

    fn is_state<S: State>(_: &S) -> bool {
        true
    }

    fn is_event<E: Event>(_: &E) -> bool {
        true
    }

    #[test]
    fn derived_enums_are_states() {
        assert!(is_state(&TestState::Initial));
        assert!(is_state(&0i64));
        assert!(is_state(&String::from("idle")));
    }

    #[test]
    fn serializable_values_are_events() {
        assert!(is_event(&TestEvent::Start));
        assert!(is_event(&"increment"));
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Processing;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn state_is_comparable() {
        let state1 = TestState::Processing;
        let state2 = TestState::Processing;
        let state3 = TestState::Complete;

        assert_eq!(state1, state2);
        assert_ne!(state1, state3);
    }
}
