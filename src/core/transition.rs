//! Transition records.

use super::state::{Event, State};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record of a single state change caused by one event.
///
/// A transition is only produced when `next_state` differs from
/// `current_state`. It serializes to a flat key-value record:
///
/// ```rust
/// use statebus::core::Transition;
///
/// let transition = Transition::new(0, "increment", 1);
/// assert_eq!(
///     transition.to_json().unwrap(),
///     r#"{"currentState":0,"event":"increment","nextState":1}"#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition<E, S> {
    /// The state before the event was applied
    pub current_state: S,
    /// The event that caused the change
    pub event: E,
    /// The state after the event was applied
    pub next_state: S,
}

impl<E: Event, S: State> Transition<E, S> {
    pub fn new(current_state: S, event: E, next_state: S) -> Self {
        Self {
            current_state,
            event,
            next_state,
        }
    }

    /// Render the transition as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<E: Event, S: State> fmt::Display for Transition<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transition {{ currentState: {:?}, event: {:?}, nextState: {:?} }}",
            self.current_state, self.event, self.next_state
        )
    }
}
