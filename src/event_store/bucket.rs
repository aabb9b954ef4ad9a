//! Per-type ordered bucket
//!
//! A `TypeBucket` holds every event of one type keyed by timestamp in a
//! lock-free skip list. Readers and writers never block each other, and a
//! key can be unlinked while other threads are walking the list.

use std::ops::Bound;

use crossbeam_skiplist::SkipMap;

use crate::types::Event;

/// Ordered, concurrency-safe collection of events of one type
#[derive(Debug, Default)]
pub struct TypeBucket {
    /// timestamp → event, ascending
    events: SkipMap<i64, Event>,
}

impl TypeBucket {
    /// Create an empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, replacing any event already stored at its timestamp
    pub fn insert(&self, event: Event) {
        self.events.insert(event.timestamp(), event);
    }

    /// Remove the event at `timestamp`; returns whether one was present
    pub fn remove(&self, timestamp: i64) -> bool {
        self.events.remove(&timestamp).is_some()
    }

    /// Number of events, approximate under concurrent mutation
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event with the least key greater than or equal to `timestamp`
    pub fn ceiling(&self, timestamp: i64) -> Option<Event> {
        self.events
            .lower_bound(Bound::Included(&timestamp))
            .map(|entry| entry.value().clone())
    }

    /// Event with the greatest key less than or equal to `timestamp`
    pub fn floor(&self, timestamp: i64) -> Option<Event> {
        self.events
            .upper_bound(Bound::Included(&timestamp))
            .map(|entry| entry.value().clone())
    }

    /// Event stored at exactly `timestamp`
    pub fn get(&self, timestamp: i64) -> Option<Event> {
        self.events
            .get(&timestamp)
            .map(|entry| entry.value().clone())
    }

    /// First event with a key inside `(lower, end)`, where `end` is exclusive
    ///
    /// The search re-seeks from the head of the list, so it is unaffected by
    /// keys removed since a previous call.
    pub fn first_in(&self, lower: Bound<i64>, end: i64) -> Option<Event> {
        self.events
            .range::<i64, _>((lower, Bound::Excluded(end)))
            .next()
            .map(|entry| entry.value().clone())
    }

    /// Earliest and latest timestamps, if any
    pub fn span(&self) -> Option<(i64, i64)> {
        let first = *self.events.front()?.key();
        let last = *self.events.back()?.key();
        Some((first, last))
    }
}
