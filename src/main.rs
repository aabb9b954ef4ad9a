//! Event Index - Binary Entry Point
//!
//! Runs a short concurrent workload against an in-memory store and prints
//! the resulting statistics as JSON. Tuning comes from `EVENT_INDEX_*`
//! environment variables, log filtering from `RUST_LOG`.

use std::thread;

use tracing_subscriber::EnvFilter;

use event_index::{Event, EventStore, EventStoreConfig, EventStoreError};

const EVENT_TYPES: [&str; 3] = ["login", "logout", "purchase"];
const EVENTS_PER_WRITER: i64 = 1_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = EventStore::with_config(EventStoreConfig::from_env())?;
    let base = chrono::Utc::now().timestamp_millis();

    tracing::info!(version = event_index::VERSION, base, "starting workload");

    let pruned = thread::scope(|s| {
        for event_type in EVENT_TYPES {
            let store = &store;
            s.spawn(move || {
                for i in 0..EVENTS_PER_WRITER {
                    store.insert(Event::new(event_type, base + i));
                }
            });
        }

        // Prune odd timestamps in the first half of the login window
        // while the writers are still running
        let reader = s.spawn(|| prune_odd(&store, "login", base, base + EVENTS_PER_WRITER / 2));
        reader.join().unwrap_or_else(|panic| {
            tracing::error!("pruning reader panicked");
            std::panic::resume_unwind(panic)
        })
    });

    let stats = store.stats();
    tracing::info!(
        total = stats.total_events,
        types = stats.type_count,
        largest = ?stats.largest_type(),
        pruned,
        "workload finished"
    );
    tracing::info!(
        first = ?store.earliest_from("login", base),
        last = ?store.latest_at("login", base + EVENTS_PER_WRITER),
        "login window"
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

fn prune_odd(store: &EventStore, event_type: &str, start: i64, end: i64) -> usize {
    let mut it = loop {
        match store.query(event_type, start, end) {
            Ok(it) => break it,
            // The writer for this type may not have created its bucket yet
            Err(EventStoreError::NotFound(_)) => thread::yield_now(),
            Err(e) => {
                tracing::error!(error = %e, "query failed");
                return 0;
            }
        }
    };

    let mut removed = 0;
    while it.advance() {
        let odd = matches!(it.current(), Ok(event) if event.timestamp() % 2 != 0);
        if odd && it.remove().is_ok() {
            removed += 1;
        }
    }
    tracing::debug!(
        start = it.start(),
        end = it.end(),
        exhausted = it.is_exhausted(),
        removed,
        "pruned window"
    );
    removed
}
