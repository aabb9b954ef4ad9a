//! Event Store - type-partitioned concurrent index
//!
//! The EventStore maps each type label to its own `TypeBucket`. Buckets are
//! created lazily on the first insert of a type and dropped wholesale by
//! `remove_all`, which makes bulk deletion a single map removal.

use std::env;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

use super::bucket::TypeBucket;
use super::error::{EventStoreError, EventStoreResult};
use super::iterator::RangeIterator;
use crate::types::Event;

/// Configuration for the EventStore
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventStoreConfig {
    /// Number of type labels to reserve room for
    pub initial_type_capacity: usize,
    /// Shard count of the type map; a power of two greater than 1
    pub shard_amount: Option<usize>,
    /// Type count at which `stats()` summarises buckets in parallel
    pub parallel_stats_threshold: usize,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            initial_type_capacity: 16,
            shard_amount: None,
            parallel_stats_threshold: 64,
        }
    }
}

impl EventStoreConfig {
    /// Defaults overlaid with `EVENT_INDEX_*` environment variables.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env_usize("EVENT_INDEX_TYPE_CAPACITY") {
            config.initial_type_capacity = capacity;
        }
        if let Some(shards) = read_env_usize("EVENT_INDEX_SHARDS") {
            config.shard_amount = Some(shards);
        }
        if let Some(threshold) = read_env_usize("EVENT_INDEX_PARALLEL_STATS") {
            config.parallel_stats_threshold = threshold;
        }

        config
    }

    /// Check the configuration before a store is built from it
    pub fn validate(&self) -> EventStoreResult<()> {
        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(EventStoreError::Config(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }
        Ok(())
    }
}

fn read_env_usize(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid environment value");
            None
        }
    }
}

/// Concurrent, type-partitioned, time-ordered event index
#[derive(Debug)]
pub struct EventStore {
    config: EventStoreConfig,
    /// type label → bucket
    buckets: DashMap<String, Arc<TypeBucket>>,
}

impl EventStore {
    /// Create a new EventStore with default config
    pub fn new() -> Self {
        let config = EventStoreConfig::default();
        Self {
            buckets: DashMap::with_capacity(config.initial_type_capacity),
            config,
        }
    }

    /// Create a new EventStore with custom config
    pub fn with_config(config: EventStoreConfig) -> EventStoreResult<Self> {
        config.validate()?;

        let buckets = match config.shard_amount {
            Some(shards) => {
                DashMap::with_capacity_and_shard_amount(config.initial_type_capacity, shards)
            }
            None => DashMap::with_capacity(config.initial_type_capacity),
        };

        Ok(Self { config, buckets })
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Store an event, replacing any event of the same type and timestamp.
    ///
    /// The bucket write happens while the map guard for the type is held, so
    /// a concurrent `remove_all` of the same type either drops the event with
    /// the bucket or runs before it and leaves it in a fresh bucket.
    ///
    /// Types that hash to the same shard wait on that guard for the length of
    /// one skip-list insert.
    pub fn insert(&self, event: Event) {
        if let Some(bucket) = self.buckets.get(event.event_type()) {
            tracing::trace!(event_type = event.event_type(), timestamp = event.timestamp(), "insert");
            bucket.insert(event);
            return;
        }

        let event_type = event.event_type().to_string();
        let bucket = self.buckets.entry(event_type).or_insert_with(|| {
            tracing::debug!(event_type = event.event_type(), "creating bucket");
            Arc::new(TypeBucket::new())
        });
        tracing::trace!(event_type = event.event_type(), timestamp = event.timestamp(), "insert");
        bucket.insert(event);
    }

    /// Remove all events of a type. A no-op for unknown types.
    ///
    /// Iterators already bound to the bucket keep their own reference and
    /// continue over the detached bucket.
    pub fn remove_all(&self, event_type: &str) {
        if let Some((_, bucket)) = self.buckets.remove(event_type) {
            tracing::debug!(event_type, removed = bucket.len(), "dropped bucket");
        }
    }

    /// Total number of events across all types.
    ///
    /// Each bucket is counted at the moment it is visited, so the total is
    /// approximate while writers are active.
    pub fn size(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.len()).sum()
    }

    /// Retrieve an iterator over events of `event_type` with
    /// `start_time <= timestamp < end_time`.
    pub fn query(
        &self,
        event_type: &str,
        start_time: i64,
        end_time: i64,
    ) -> EventStoreResult<RangeIterator> {
        if end_time <= start_time {
            return Err(EventStoreError::InvalidArgument(format!(
                "end_time ({}) must be greater than start_time ({})",
                end_time, start_time
            )));
        }

        let bucket = self
            .bucket(event_type)
            .ok_or_else(|| EventStoreError::NotFound(event_type.to_string()))?;

        tracing::trace!(event_type, start_time, end_time, "query");
        Ok(RangeIterator::new(bucket, start_time, end_time))
    }

    /// Number of events of one type (0 if the type is unknown)
    pub fn len_of(&self, event_type: &str) -> usize {
        self.buckets
            .get(event_type)
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    /// Check if a bucket exists for a type
    pub fn contains_type(&self, event_type: &str) -> bool {
        self.buckets.contains_key(event_type)
    }

    /// Number of type buckets
    pub fn type_count(&self) -> usize {
        self.buckets.len()
    }

    /// Type labels currently present, sorted
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.buckets.iter().map(|b| b.key().clone()).collect();
        types.sort();
        types
    }

    /// Check if the store holds no events
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.is_empty())
    }

    /// Earliest and latest timestamp of a type
    pub fn time_span(&self, event_type: &str) -> Option<(i64, i64)> {
        self.bucket(event_type)?.span()
    }

    /// The event of a type with the least timestamp `>= at`
    pub fn earliest_from(&self, event_type: &str, at: i64) -> Option<Event> {
        self.bucket(event_type)?.ceiling(at)
    }

    /// The event of a type with the greatest timestamp `<= at`
    pub fn latest_at(&self, event_type: &str, at: i64) -> Option<Event> {
        self.bucket(event_type)?.floor(at)
    }

    /// Clone the bucket handle out of the map so no guard outlives the call
    pub(crate) fn bucket(&self, event_type: &str) -> Option<Arc<TypeBucket>> {
        self.buckets.get(event_type).map(|b| Arc::clone(b.value()))
    }

    /// Snapshot of (type, bucket) handles
    pub(crate) fn buckets(&self) -> Vec<(String, Arc<TypeBucket>)> {
        self.buckets
            .iter()
            .map(|b| (b.key().clone(), Arc::clone(b.value())))
            .collect()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(events: &[(&str, i64)]) -> EventStore {
        let store = EventStore::new();
        for &(event_type, ts) in events {
            store.insert(Event::new(event_type, ts));
        }
        store
    }

    #[test]
    fn test_simple_insertion() {
        let store = store_with(&[("test", 100)]);
        assert_eq!(store.size(), 1);
        assert!(store.contains_type("test"));
    }

    #[test]
    fn test_duplicate_timestamp_replaces() {
        let store = store_with(&[("A", 1), ("A", 1), ("B", 1)]);
        assert_eq!(store.size(), 2);
        assert_eq!(store.len_of("A"), 1);
    }

    #[test]
    fn test_remove_all_from_type() {
        let store = store_with(&[("A", 0), ("B", 1), ("A", 2), ("A", 3), ("A", 4), ("C", 5)]);
        assert_eq!(store.size(), 6);

        store.remove_all("A");
        assert_eq!(store.size(), 2);
        assert!(!store.contains_type("A"));

        // Unknown type is a no-op
        store.remove_all("Z");
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_query_errors() {
        let store = store_with(&[("A", 0), ("A", 10), ("A", 20)]);

        assert!(matches!(
            store.query("B", 0, 20),
            Err(EventStoreError::NotFound(t)) if t == "B"
        ));
        assert!(matches!(
            store.query("A", 20, 0),
            Err(EventStoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.query("A", 5, 5),
            Err(EventStoreError::InvalidArgument(_))
        ));
        // Window is validated before the type lookup
        assert!(matches!(
            store.query("B", 5, 5),
            Err(EventStoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_emptied_bucket_stays_queryable() {
        let store = store_with(&[("A", 1)]);

        let mut it = store.query("A", 0, 10).unwrap();
        assert!(it.advance());
        it.remove().unwrap();

        assert_eq!(store.size(), 0);
        assert!(store.is_empty());
        assert!(store.contains_type("A"));

        let mut it = store.query("A", 0, 10).unwrap();
        assert!(!it.advance());
    }

    #[test]
    fn test_iterator_survives_remove_all() {
        let store = store_with(&[("A", 1), ("A", 2), ("A", 3)]);
        let mut it = store.query("A", 0, 10).unwrap();
        assert!(it.advance());

        store.remove_all("A");

        it.remove().unwrap();
        assert!(it.advance());
        assert_eq!(it.current().unwrap().timestamp(), 2);
        assert_eq!(store.size(), 0);
        assert!(matches!(store.query("A", 0, 10), Err(EventStoreError::NotFound(_))));
    }

    #[test]
    fn test_insert_after_remove_all_starts_fresh_bucket() {
        let store = store_with(&[("A", 1), ("A", 2)]);
        store.remove_all("A");
        store.insert(Event::new("A", 7));

        let seen: Vec<i64> = store
            .query("A", i64::MIN, i64::MAX)
            .unwrap()
            .map(|e| e.timestamp())
            .collect();
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn test_inspection_helpers() {
        let store = store_with(&[("B", 5), ("A", -4), ("A", 9), ("A", 2)]);

        assert_eq!(store.types(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(store.type_count(), 2);
        assert_eq!(store.time_span("A"), Some((-4, 9)));
        assert_eq!(store.time_span("Z"), None);

        assert_eq!(store.latest_at("A", 3), Some(Event::new("A", 2)));
        assert_eq!(store.latest_at("A", 9), Some(Event::new("A", 9)));
        assert_eq!(store.latest_at("A", -5), None);
        assert_eq!(store.earliest_from("A", -3), Some(Event::new("A", 2)));
        assert_eq!(store.earliest_from("A", 10), None);
        assert_eq!(store.earliest_from("Z", 0), None);
        assert_eq!(store.len_of("Z"), 0);
    }

    #[test]
    fn test_config_validation() {
        let config = EventStoreConfig {
            shard_amount: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            EventStore::with_config(config),
            Err(EventStoreError::Config(_))
        ));

        let config = EventStoreConfig {
            shard_amount: Some(8),
            ..Default::default()
        };
        let store = EventStore::with_config(config).unwrap();
        store.insert(Event::new("A", 1));
        assert_eq!(store.size(), 1);
        assert_eq!(store.config().shard_amount, Some(8));
    }

    #[test]
    fn test_config_from_env() {
        // One test owns every EVENT_INDEX_* variable; the environment is
        // process-wide
        const KEYS: [&str; 3] = [
            "EVENT_INDEX_TYPE_CAPACITY",
            "EVENT_INDEX_SHARDS",
            "EVENT_INDEX_PARALLEL_STATS",
        ];

        env::set_var("EVENT_INDEX_TYPE_CAPACITY", "128");
        env::set_var("EVENT_INDEX_SHARDS", " 32 ");
        env::set_var("EVENT_INDEX_PARALLEL_STATS", "4");
        let config = EventStoreConfig::from_env();
        assert_eq!(config.initial_type_capacity, 128);
        assert_eq!(config.shard_amount, Some(32));
        assert_eq!(config.parallel_stats_threshold, 4);
        assert!(EventStore::with_config(config).is_ok());

        // Unparsable values fall back to the defaults
        env::set_var("EVENT_INDEX_TYPE_CAPACITY", "lots");
        env::set_var("EVENT_INDEX_SHARDS", "-2");
        env::set_var("EVENT_INDEX_PARALLEL_STATS", "");
        let config = EventStoreConfig::from_env();
        let defaults = EventStoreConfig::default();
        assert_eq!(config.initial_type_capacity, defaults.initial_type_capacity);
        assert_eq!(config.shard_amount, None);
        assert_eq!(config.parallel_stats_threshold, defaults.parallel_stats_threshold);

        // Parsable but invalid shard count is rejected when the store is built
        env::set_var("EVENT_INDEX_SHARDS", "6");
        let config = EventStoreConfig::from_env();
        assert_eq!(config.shard_amount, Some(6));
        assert!(matches!(
            EventStore::with_config(config),
            Err(EventStoreError::Config(_))
        ));

        for key in KEYS {
            env::remove_var(key);
        }
        assert_eq!(EventStoreConfig::from_env().shard_amount, None);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: EventStoreConfig =
            serde_json::from_str(r#"{"shard_amount": 16}"#).unwrap();
        assert_eq!(config.shard_amount, Some(16));
        assert_eq!(config.initial_type_capacity, 16);
        assert_eq!(config.parallel_stats_threshold, 64);
    }
}
