//! Error types for event store operations

use thiserror::Error;

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventStoreError {
    /// The caller passed a malformed argument, e.g. an empty query window
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No bucket exists for the queried type
    #[error("Event type not found: {0}")]
    NotFound(String),

    /// An iterator was used without a current event
    #[error("Illegal iterator state: {0}")]
    IllegalState(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EventStoreError::NotFound("B".to_string()).to_string(),
            "Event type not found: B"
        );
        assert_eq!(
            EventStoreError::IllegalState("advance() was never called").to_string(),
            "Illegal iterator state: advance() was never called"
        );
    }
}
