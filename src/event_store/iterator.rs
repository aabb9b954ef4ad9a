//! Range iterator over one bucket
//!
//! The iterator keeps its own `Arc` to the bucket it was created from, so it
//! keeps working after `remove_all` detaches that bucket from the store.
//!
//! Positioning is two-phase: `advance()` moves to the next event, then
//! `current()` reads it and `remove()` deletes it from the bucket.
//!
//! ```text
//! Unpositioned ──advance()=true──► Positioned ──advance()=false──► Exhausted
//!      │                            ▲      │                          │
//!      └──advance()=false──┐        └──────┘ advance()=true           └─ advance()=false
//!                          ▼
//!                      Exhausted
//! ```

use std::ops::Bound;
use std::sync::Arc;

use super::bucket::TypeBucket;
use super::error::{EventStoreError, EventStoreResult};
use crate::types::Event;

const NOT_POSITIONED: &str = "advance() was never called";
const EXHAUSTED: &str = "iterator is exhausted";
const ALREADY_REMOVED: &str = "current event was already removed";

#[derive(Debug, Clone)]
enum CursorState {
    Unpositioned,
    Positioned { event: Event, removed: bool },
    Exhausted,
}

/// Cursor over the events of one type inside `[start, end)`
#[derive(Debug)]
pub struct RangeIterator {
    bucket: Arc<TypeBucket>,
    start: i64,
    end: i64,
    state: CursorState,
}

impl RangeIterator {
    pub(crate) fn new(bucket: Arc<TypeBucket>, start: i64, end: i64) -> Self {
        Self {
            bucket,
            start,
            end,
            state: CursorState::Unpositioned,
        }
    }

    /// Move to the next event, if any.
    ///
    /// Returns `false` once the window has no event after the last one
    /// returned. The iterator is then exhausted and stays that way.
    pub fn advance(&mut self) -> bool {
        let lower = match &self.state {
            CursorState::Unpositioned => Bound::Included(self.start),
            CursorState::Positioned { event, .. } => Bound::Excluded(event.timestamp()),
            CursorState::Exhausted => return false,
        };

        match self.bucket.first_in(lower, self.end) {
            Some(event) => {
                self.state = CursorState::Positioned {
                    event,
                    removed: false,
                };
                true
            }
            None => {
                self.state = CursorState::Exhausted;
                false
            }
        }
    }

    /// The event at the current position
    pub fn current(&self) -> EventStoreResult<&Event> {
        match &self.state {
            CursorState::Positioned { event, .. } => Ok(event),
            CursorState::Unpositioned => Err(EventStoreError::IllegalState(NOT_POSITIONED)),
            CursorState::Exhausted => Err(EventStoreError::IllegalState(EXHAUSTED)),
        }
    }

    /// Remove the current event from the underlying bucket.
    ///
    /// The position is kept, so the next `advance()` continues with the key
    /// that followed the removed one. A second call at the same position is
    /// an `IllegalState` and leaves any event re-inserted at that timestamp
    /// untouched.
    pub fn remove(&mut self) -> EventStoreResult<()> {
        let (timestamp, removed) = match &mut self.state {
            CursorState::Positioned { removed: true, .. } => {
                return Err(EventStoreError::IllegalState(ALREADY_REMOVED))
            }
            CursorState::Positioned { event, removed } => {
                *removed = true;
                (event.timestamp(), self.bucket.remove(event.timestamp()))
            }
            CursorState::Unpositioned => return Err(EventStoreError::IllegalState(NOT_POSITIONED)),
            CursorState::Exhausted => return Err(EventStoreError::IllegalState(EXHAUSTED)),
        };
        tracing::trace!(timestamp, removed, "removed event through iterator");
        Ok(())
    }

    /// Inclusive start of the window
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive end of the window
    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }
}

impl Iterator for RangeIterator {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if !self.advance() {
            return None;
        }
        self.current().ok().cloned()
    }
}
