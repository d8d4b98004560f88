//! Per-machine configuration.

use serde::{Deserialize, Serialize};

/// Default capacity of the state subscription channel.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Configuration for a single state machine instance.
///
/// ```rust
/// use statebus::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str(r#"{"name": "cart"}"#).unwrap();
/// assert_eq!(config.name, "cart");
/// assert_eq!(config.subscriber_capacity, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Name used in logs, errors and observer notifications.
    pub name: String,
    /// Number of applied states buffered per subscriber before it lags.
    pub subscriber_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: "machine".to_string(),
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl MachineConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Capacity handed to the broadcast channel, which rejects zero.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.subscriber_capacity.max(1)
    }
}
