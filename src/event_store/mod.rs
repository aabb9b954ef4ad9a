//! Event Store Module
//!
//! This module provides the concurrent event index:
//! - `EventStore`: type label → bucket map, owns bucket lifecycle
//! - `TypeBucket`: lock-free ordered map of timestamp → event for one type
//! - `RangeIterator`: two-phase cursor over a half-open time window
//! - `EventStoreStats`: point-in-time statistics
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────────────┐    ┌────────────────────────┐
//! │ insert  │───►│ DashMap shard    │───►│ SkipMap<i64, Event>    │
//! │ (Event) │    │ type → bucket    │    │ insert-or-replace      │
//! └─────────┘    └──────────────────┘    └────────────────────────┘
//!
//! Read Path:
//! ┌──────────────────┐    ┌──────────────┐    ┌───────────────────────┐
//! │ query(type, s, e)│───►│ Arc<bucket>  │───►│ RangeIterator [s, e)  │
//! └──────────────────┘    └──────────────┘    │ advance/current/remove│
//!                                             └───────────────────────┘
//! ```

mod bucket;
mod error;
mod iterator;
mod stats;
mod store;

pub use bucket::TypeBucket;
pub use error::{EventStoreError, EventStoreResult};
pub use iterator::RangeIterator;
pub use stats::{EventStoreStats, TypeStats};
pub use store::{EventStore, EventStoreConfig};
