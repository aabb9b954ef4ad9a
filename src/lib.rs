//! Event Index
//!
//! An in-memory, type-partitioned, time-ordered event index built for
//! concurrent writers and readers.
//!
//! # Features
//!
//! - **Sharded by type**: each event type lives in its own ordered bucket,
//!   so `remove_all` drops a whole type in one map removal
//! - **Lock-free buckets**: timestamps are kept in a concurrent skip list
//! - **Range queries**: half-open `[start, end)` windows over one type
//! - **Safe removal during iteration**: cursors over the same bucket can
//!   delete events while others keep traversing
//!
//! # Modules
//!
//! - `types`: the `Event` value
//! - `event_store`: store, buckets, range iterator, statistics
//!
//! # Example
//!
//! ```
//! use event_index::{Event, EventStore};
//!
//! let store = EventStore::new();
//! store.insert(Event::new("login", 10));
//! store.insert(Event::new("login", 20));
//!
//! let mut it = store.query("login", 0, 15).unwrap();
//! while it.advance() {
//!     assert_eq!(it.current().unwrap().timestamp(), 10);
//!     it.remove().unwrap();
//! }
//! assert_eq!(store.size(), 1);
//! ```

pub mod event_store;
pub mod types;

// Re-export commonly used items at crate root
pub use event_store::{
    EventStore, EventStoreConfig, EventStoreError, EventStoreResult, EventStoreStats,
    RangeIterator, TypeStats,
};
pub use types::Event;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
