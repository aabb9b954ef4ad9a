//! Event Store Statistics
//!
//! Provides a point-in-time summary of the store:
//! - Event counts by type
//! - Earliest/latest timestamp per type
//! - Totals across types

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use super::bucket::TypeBucket;
use super::store::EventStore;

/// Summary of one type bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    /// Number of events of this type
    pub count: usize,
    /// Earliest timestamp
    pub earliest: Option<i64>,
    /// Latest timestamp
    pub latest: Option<i64>,
}

impl TypeStats {
    fn from_bucket(bucket: &TypeBucket) -> Self {
        let span = bucket.span();
        Self {
            count: bucket.len(),
            earliest: span.map(|(first, _)| first),
            latest: span.map(|(_, last)| last),
        }
    }
}

/// Statistics about the Event Store
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventStoreStats {
    /// Total number of events
    pub total_events: usize,
    /// Number of type buckets
    pub type_count: usize,
    /// Per-type summaries, ordered by type label
    pub events_by_type: BTreeMap<String, TypeStats>,
}

impl EventStoreStats {
    /// Largest bucket, if any
    pub fn largest_type(&self) -> Option<(&str, usize)> {
        self.events_by_type
            .iter()
            .max_by_key(|(_, stats)| stats.count)
            .map(|(name, stats)| (name.as_str(), stats.count))
    }
}

impl EventStore {
    /// Collect statistics over every bucket.
    ///
    /// Buckets are summarised one at a time while mutation continues, so the
    /// result is a consistent view of each bucket but not of the whole store.
    pub fn stats(&self) -> EventStoreStats {
        let buckets = self.buckets();

        let summaries: Vec<(String, TypeStats)> =
            if buckets.len() >= self.config().parallel_stats_threshold {
                buckets.par_iter().map(summarize).collect()
            } else {
                buckets.iter().map(summarize).collect()
            };

        let events_by_type: BTreeMap<String, TypeStats> = summaries.into_iter().collect();
        EventStoreStats {
            total_events: events_by_type.values().map(|s| s.count).sum(),
            type_count: events_by_type.len(),
            events_by_type,
        }
    }
}

fn summarize((name, bucket): &(String, Arc<TypeBucket>)) -> (String, TypeStats) {
    (name.clone(), TypeStats::from_bucket(bucket))
}
