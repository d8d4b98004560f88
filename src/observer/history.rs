//! Recording observer.
//!
//! Keeps an ordered, timestamped log of every notification a hub forwards.
//! Useful for audits and for asserting on machine behavior in tests.

use super::{MachineRef, Observer, Payload};
use crate::error::MachineError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Kind of notification an [`Observation`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    Event,
    Transition,
    Error,
}

/// Single recorded notification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    /// The machine that produced the notification
    pub machine: MachineRef,
    /// What was observed
    pub kind: ObservationKind,
    /// JSON rendering of the event, transition or error
    pub payload: serde_json::Value,
    /// When the observer received it
    pub timestamp: DateTime<Utc>,
}

/// Observer recording every notification in arrival order.
///
/// # Example
///
/// ```rust
/// use statebus::core::Transition;
/// use statebus::observer::{MachineRef, ObservationLog, Observer};
///
/// let log = ObservationLog::new();
/// let machine = MachineRef::new("counter");
///
/// log.on_transition(&machine, &Transition::new(0, "increment", 1));
/// log.on_transition(&machine, &Transition::new(1, "increment", 2));
///
/// let path = log.path(machine.id);
/// assert_eq!(path, vec![serde_json::json!(0), serde_json::json!(1), serde_json::json!(2)]);
/// ```
#[derive(Debug, Default)]
pub struct ObservationLog {
    entries: Mutex<Vec<Observation>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, machine: &MachineRef, kind: ObservationKind, payload: serde_json::Value) {
        self.entries.lock().push(Observation {
            machine: machine.clone(),
            kind,
            payload,
            timestamp: Utc::now(),
        });
    }

    /// Snapshot of every recorded observation.
    pub fn entries(&self) -> Vec<Observation> {
        self.entries.lock().clone()
    }

    /// Observations of one kind, in arrival order.
    pub fn of_kind(&self, kind: ObservationKind) -> Vec<Observation> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect()
    }

    /// Transition payloads recorded for one machine, in arrival order.
    pub fn transitions(&self, machine: Uuid) -> Vec<serde_json::Value> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| {
                entry.kind == ObservationKind::Transition && entry.machine.id == machine
            })
            .map(|entry| entry.payload.clone())
            .collect()
    }

    /// Sequence of states a machine moved through.
    ///
    /// Returns the starting state of the first transition followed by the
    /// next state of every transition, or an empty path if none was recorded.
    pub fn path(&self, machine: Uuid) -> Vec<serde_json::Value> {
        let transitions = self.transitions(machine);
        let mut path = Vec::with_capacity(transitions.len() + 1);
        if let Some(first) = transitions.first() {
            path.push(first["currentState"].clone());
        }
        for transition in &transitions {
            path.push(transition["nextState"].clone());
        }
        path
    }

    /// Time between the first and last recorded observation.
    pub fn duration(&self) -> Option<Duration> {
        let entries = self.entries.lock();
        if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

fn to_value(payload: &dyn Payload) -> serde_json::Value {
    payload
        .to_json()
        .unwrap_or_else(|_| serde_json::Value::String(format!("{:?}", payload)))
}

impl Observer for ObservationLog {
    fn on_event(&self, machine: &MachineRef, event: &dyn Payload) {
        self.record(machine, ObservationKind::Event, to_value(event));
    }

    fn on_transition(&self, machine: &MachineRef, transition: &dyn Payload) {
        self.record(machine, ObservationKind::Transition, to_value(transition));
    }

    fn on_error(&self, machine: &MachineRef, error: &MachineError) {
        self.record(
            machine,
            ObservationKind::Error,
            serde_json::json!({
                "code": error.error_code(),
                "message": error.to_string(),
            }),
        );
    }
}
