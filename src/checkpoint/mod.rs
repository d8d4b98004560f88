//! Checkpoint and resume for state machines.
//!
//! A checkpoint captures a machine's current state together with its
//! identity, so a machine can be rebuilt with the same state after a
//! process restart. Checkpoints encode to JSON for readability or to
//! bincode for compactness.

use crate::core::State;
use crate::observer::MachineRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::CheckpointError;

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Snapshot of a machine's state.
///
/// # Example
///
/// ```rust
/// use statebus::checkpoint::Checkpoint;
/// use statebus::observer::MachineRef;
///
/// let checkpoint = Checkpoint::capture(&MachineRef::new("cart"), vec![1u32, 2, 3]);
/// let json = checkpoint.to_json().unwrap();
/// let restored: Checkpoint<Vec<u32>> = Checkpoint::from_json(&json).unwrap();
/// assert_eq!(restored.state, vec![1, 2, 3]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State> {
    /// Format version, checked on load
    pub version: u32,

    /// Machine the checkpoint was taken from
    pub machine: MachineRef,

    /// When the checkpoint was taken
    pub timestamp: DateTime<Utc>,

    /// State at the time of the checkpoint
    pub state: S,
}

impl<S: State> Checkpoint<S> {
    pub fn capture(machine: &MachineRef, state: S) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            machine: machine.clone(),
            timestamp: Utc::now(),
            state,
        }
    }

    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}
