//! Read-mostly freshness cache for fetched market data.
//!
//! Entries are keyed by a request key (symbol, symbol + range, ...) and stay
//! fresh for a fixed time-to-live. Readers load an `Arc<HashMap<..>>`
//! snapshot without locking; writers swap in a copied map via `rcu`. The maps
//! hold a handful of symbols, so copying on write is cheap.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;
use tracing::trace;

/// How long a quote snapshot stays fresh.
pub const QUOTE_TTL: Duration = Duration::from_secs(60);
/// How long an options chain stays fresh.
pub const CHAIN_TTL: Duration = Duration::from_secs(5 * 60);
/// How long a daily history stays fresh.
pub const HISTORY_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct Entry<V> {
    stored_at: Instant,
    value: Arc<V>,
}

// Manual impl: cloning an entry clones the Arc, never `V`.
impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            stored_at: self.stored_at,
            value: Arc::clone(&self.value),
        }
    }
}

/// Time-to-live cache of shared values.
#[derive(Debug)]
pub struct FreshnessCache<V> {
    ttl: Duration,
    entries: ArcSwap<HashMap<String, Entry<V>>>,
}

impl<V> FreshnessCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key` if it is younger than the TTL.
    pub fn get_fresh(&self, key: &str) -> Option<Arc<V>> {
        self.get_fresh_at(key, Instant::now())
    }

    fn get_fresh_at(&self, key: &str, now: Instant) -> Option<Arc<V>> {
        let snap = self.entries.load();
        let entry = snap.get(key)?;
        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            trace!(key, "cache hit");
            Some(Arc::clone(&entry.value))
        } else {
            None
        }
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: V) -> Arc<V> {
        self.insert_at(key.into(), value, Instant::now())
    }

    fn insert_at(&self, key: String, value: V, now: Instant) -> Arc<V> {
        let value = Arc::new(value);
        let entry = Entry {
            stored_at: now,
            value: Arc::clone(&value),
        };
        let ttl = self.ttl;
        self.entries.rcu(|current| {
            let mut next: HashMap<String, Entry<V>> = current
                .iter()
                .filter(|(_, e)| now.saturating_duration_since(e.stored_at) < ttl)
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect();
            next.insert(key.clone(), entry.clone());
            next
        });
        value
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.store(Arc::new(HashMap::new()));
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
