//! Shared in-memory cache for provider responses.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// Async cache with optional per-entry TTL. Providers share one instance per
/// value type so repeated commands in a single run hit the network once.
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + std::fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value unless the entry is missing or expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at < Instant::now()) {
                    debug!("Cache expired for {key:?}");
                    return None;
                }
                debug!("Cache HIT for {key:?}");
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for {key:?}");
                None
            }
        }
    }

    /// Stores a value; a `None` TTL keeps it for the process lifetime.
    pub async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let entry = Entry {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        let mut entries = self.entries.lock().await;
        debug!("Cache PUT for {key:?}");
        entries.insert(key, entry);
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + std::fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
