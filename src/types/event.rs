//! Event value type
//!
//! An event is an immutable (type, timestamp) pair. Events are owned by the
//! bucket slot that holds them and are cloned out to readers.

use serde::{Deserialize, Serialize};

use crate::event_store::{EventStoreError, EventStoreResult};

/// An immutable event stored in the index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Type label used to partition the index
    #[serde(rename = "type")]
    event_type: String,
    /// Timestamp, any sign and magnitude
    timestamp: i64,
}

impl Event {
    /// Create a new event from a known-good type label.
    ///
    /// The label must not be empty; use `try_new` for labels that come from
    /// outside the program.
    pub fn new(event_type: impl Into<String>, timestamp: i64) -> Self {
        let event_type = event_type.into();
        debug_assert!(!event_type.is_empty(), "event type must not be empty");
        Self {
            event_type,
            timestamp,
        }
    }

    /// Create a new event, rejecting an empty type label
    pub fn try_new(event_type: impl Into<String>, timestamp: i64) -> EventStoreResult<Self> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(EventStoreError::InvalidArgument(
                "event type must not be empty".to_string(),
            ));
        }
        Ok(Self::new(event_type, timestamp))
    }

    /// Type label of the event
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Timestamp of the event
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Serialize to a single JSON line
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON line
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.event_type, self.timestamp)
    }
}
